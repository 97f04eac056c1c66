//! Signed Bearer Tokens
//!
//! Compact `header.payload.signature` tokens (JWT layout, HS256 only):
//! - header and payload are JSON, base64url without padding
//! - signature is HMAC-SHA256 over `header.payload` with a shared secret
//!
//! Issuer and verifier are the same service, so a symmetric secret is
//! enough. Tokens are never stored; expiry is the only way they stop being
//! valid.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};

/// Minimum secret length in bytes (matches the HMAC-SHA256 output size)
pub const MIN_SECRET_LENGTH: usize = 32;

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

// ============================================================================
// Error Types
// ============================================================================

/// Token signing/verification errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not three segments, bad base64, bad JSON or unsupported header
    #[error("Malformed token")]
    Malformed,

    /// MAC does not match
    #[error("Invalid token signature")]
    InvalidSignature,

    /// `now >= exp`
    #[error("Token expired")]
    TokenExpired,

    /// `now < nbf`
    #[error("Token not yet valid")]
    TokenNotYetValid,

    /// `iss` is not the configured issuer
    #[error("Token issuer mismatch")]
    IssuerMismatch,

    /// Lifetime would not put `exp` strictly after `iat`
    #[error("Token lifetime must be at least one second")]
    InvalidLifetime,

    /// Secret shorter than [`MIN_SECRET_LENGTH`]
    #[error("Token secret must be at least {MIN_SECRET_LENGTH} bytes")]
    WeakSecret,

    /// Claims could not be serialized
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

// ============================================================================
// Secret
// ============================================================================

/// Symmetric signing secret
///
/// Zeroized on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct TokenSecret(Vec<u8>);

impl TokenSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SECRET_LENGTH {
            return Err(TokenError::WeakSecret);
        }
        Ok(Self(bytes))
    }

    /// Fresh random secret (for development and tests)
    pub fn random() -> Self {
        Self(crate::crypto::random_bytes(MIN_SECRET_LENGTH))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenSecret").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Signed token payload. Times are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer
    pub iss: String,
    /// Subject (account id)
    pub sub: String,
    /// Issued at
    pub iat: i64,
    /// Not before
    pub nbf: i64,
    /// Expiry
    pub exp: i64,
}

impl TokenClaims {
    /// Claims valid from `issued_at` for `lifetime`
    pub fn new(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, TokenError> {
        if lifetime < Duration::seconds(1) {
            return Err(TokenError::InvalidLifetime);
        }
        let iat = issued_at.timestamp();
        let exp = iat
            .checked_add(lifetime.num_seconds())
            .filter(|exp| DateTime::from_timestamp(*exp, 0).is_some())
            .ok_or(TokenError::InvalidLifetime)?;
        Ok(Self {
            iss: issuer.into(),
            sub: subject.into(),
            iat,
            nbf: iat,
            exp,
        })
    }

    /// `None` only for claims decoded from a token with an absurd `exp`
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

// ============================================================================
// Codec
// ============================================================================

/// HS256 token codec bound to one secret
///
/// ## Examples
/// ```rust
/// use chrono::{Duration, Utc};
/// use platform::token::{TokenClaims, TokenCodec, TokenSecret};
///
/// let codec = TokenCodec::new(TokenSecret::random(), Some("identity".into()));
/// let now = Utc::now();
/// let claims = TokenClaims::new("identity", "account-1", now, Duration::minutes(15))?;
/// let token = codec.sign(&claims)?;
/// assert_eq!(codec.verify(&token, now)?, claims);
/// # Ok::<(), platform::token::TokenError>(())
/// ```
#[derive(Clone, Debug)]
pub struct TokenCodec {
    secret: TokenSecret,
    issuer: Option<String>,
}

impl TokenCodec {
    /// `issuer`, when set, is enforced on verification
    pub fn new(secret: TokenSecret, issuer: Option<String>) -> Self {
        Self { secret, issuer }
    }

    /// Serialize and sign claims
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        };
        let header = serde_json::to_vec(&header).map_err(|e| TokenError::Encoding(e.to_string()))?;
        let payload = serde_json::to_vec(claims).map_err(|e| TokenError::Encoding(e.to_string()))?;

        let signing_input = format!("{}.{}", to_base64url(&header), to_base64url(&payload));
        let signature = hmac_sha256(self.secret.as_bytes(), signing_input.as_bytes());

        Ok(format!("{}.{}", signing_input, to_base64url(&signature)))
    }

    /// Check signature, then timing window, then issuer
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let signature = from_base64url(signature_b64).map_err(|_| TokenError::Malformed)?;
        let signing_input = &token[..header_b64.len() + 1 + payload_b64.len()];
        if !verify_hmac_sha256(self.secret.as_bytes(), signing_input.as_bytes(), &signature) {
            return Err(TokenError::InvalidSignature);
        }

        let header: Header = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::Malformed);
        }
        let claims: TokenClaims = decode_segment(payload_b64)?;

        let now_ts = now.timestamp();
        if now_ts >= claims.exp {
            return Err(TokenError::TokenExpired);
        }
        if now_ts < claims.nbf {
            return Err(TokenError::TokenNotYetValid);
        }
        if let Some(issuer) = &self.issuer {
            if &claims.iss != issuer {
                return Err(TokenError::IssuerMismatch);
            }
        }

        Ok(claims)
    }
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, TokenError> {
    let bytes = from_base64url(segment).map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

// ============================================================================
// Tests
// ============================================================================
