//! Authorization header parsing

use http::{HeaderMap, header};

/// Why no bearer token could be read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("Missing Authorization header")]
    Missing,

    #[error("Authorization header is not a Bearer token")]
    Malformed,
}

/// Extract the token from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively; surrounding whitespace is
/// trimmed. An empty token counts as malformed.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::Malformed)?
        .trim();

    let (scheme, token) = value.split_once(' ').ok_or(BearerError::Malformed)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(BearerError::Malformed);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(BearerError::Malformed);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extracts_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers("bearer   xyz ")), Ok("xyz"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), Err(BearerError::Missing));
    }

    #[test]
    fn test_wrong_scheme_or_empty() {
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcg==")), Err(BearerError::Malformed));
        assert_eq!(extract_bearer_token(&headers("Bearer")), Err(BearerError::Malformed));
        assert_eq!(extract_bearer_token(&headers("Bearer   ")), Err(BearerError::Malformed));
    }
}
