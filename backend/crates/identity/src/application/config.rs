//! Application Configuration
//!
//! Configuration for the Identity application layer.

use std::fmt;
use std::time::Duration;

use chrono::TimeDelta;
use platform::token::TokenSecret;
use thiserror::Error;

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(365 * 24 * 3600);

/// Rejected lifetime settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Token lifetimes must be at least one second")]
    LifetimeTooShort,

    #[error("Token lifetimes must be at most {} seconds", MAX_TOKEN_TTL.as_secs())]
    LifetimeTooLong,

    #[error("Refresh token lifetime must be longer than the access token lifetime")]
    RefreshNotLonger,
}

/// Identity application configuration
#[derive(Clone)]
pub struct IdentityConfig {
    /// `iss` claim written into and required from every token
    pub issuer: String,
    /// HMAC signing secret (at least 32 bytes)
    pub token_secret: TokenSecret,
    /// Access token lifetime (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (1 week)
    pub refresh_token_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Upper bound for one request's work; `None` disables the deadline
    pub request_timeout: Option<Duration>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            issuer: "identity".to_string(),
            token_secret: TokenSecret::random(),
            access_token_ttl: Duration::from_secs(15 * 60), // 15 minutes
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            password_pepper: None,
            request_timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("issuer", &self.issuer)
            .field("token_secret", &self.token_secret)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field(
                "password_pepper",
                &self.password_pepper.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl IdentityConfig {
    /// Config signing with the given secret
    pub fn with_secret(token_secret: TokenSecret) -> Self {
        Self {
            token_secret,
            ..Default::default()
        }
    }

    /// Create config for development (random secret, throwaway issuer)
    pub fn development() -> Self {
        Self {
            issuer: "identity-dev".to_string(),
            ..Default::default()
        }
    }

    /// Both lifetimes in `[1s, MAX_TOKEN_TTL]`, refresh strictly longer
    pub fn validate(&self) -> Result<(), ConfigError> {
        for ttl in [self.access_token_ttl, self.refresh_token_ttl] {
            if ttl.as_secs() == 0 {
                return Err(ConfigError::LifetimeTooShort);
            }
            if ttl > MAX_TOKEN_TTL {
                return Err(ConfigError::LifetimeTooLong);
            }
        }
        if self.refresh_token_ttl <= self.access_token_ttl {
            return Err(ConfigError::RefreshNotLonger);
        }
        Ok(())
    }

    /// `None` when the configured TTL does not fit a `TimeDelta`
    pub fn access_token_lifetime(&self) -> Option<TimeDelta> {
        to_time_delta(self.access_token_ttl)
    }

    pub fn refresh_token_lifetime(&self) -> Option<TimeDelta> {
        to_time_delta(self.refresh_token_ttl)
    }
}

fn to_time_delta(ttl: Duration) -> Option<TimeDelta> {
    i64::try_from(ttl.as_secs())
        .ok()
        .and_then(TimeDelta::try_seconds)
}
