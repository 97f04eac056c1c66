//! Identity Error Types
//!
//! Service-level error variants with stable machine-readable codes,
//! converted into the unified `kernel::error::AppError` at the HTTP edge.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::bearer::BearerError;
use platform::password::PasswordHashError;
use platform::token::TokenError;
use thiserror::Error;

use crate::domain::repository::StoreError;

/// Identity-specific result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity-specific error variants
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Email already registered
    #[error("Account already exists")]
    AccountAlreadyExists,

    /// No account matches the lookup
    #[error("Account not found")]
    AccountNotFound,

    /// Password does not verify against the stored hash
    #[error("Invalid password")]
    InvalidPassword,

    /// Malformed, forged, expired or not-yet-valid token
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    /// Password hashing primitive failed
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] PasswordHashError),

    /// Caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// Request deadline passed
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Rejected input (email format, empty name, ...)
    #[error("{0}")]
    InvalidInput(String),

    /// Authenticated, but not allowed to touch this account
    #[error("Not allowed to modify another account")]
    Forbidden,

    /// Account store failure
    #[error("Account store error: {0}")]
    Store(StoreError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Stable code for clients and logs
    pub fn code(&self) -> &'static str {
        match self {
            IdentityError::AccountAlreadyExists => "account_already_exists",
            IdentityError::AccountNotFound => "account_not_found",
            IdentityError::InvalidPassword => "invalid_password",
            IdentityError::InvalidToken(_) => "invalid_token",
            IdentityError::Hashing(_) => "hashing_failed",
            IdentityError::Cancelled => "cancelled",
            IdentityError::DeadlineExceeded => "deadline_exceeded",
            IdentityError::InvalidInput(_) => "invalid_input",
            IdentityError::Forbidden => "forbidden",
            IdentityError::Store(_) | IdentityError::Internal(_) => "internal",
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::AccountAlreadyExists => ErrorKind::Conflict,
            IdentityError::AccountNotFound => ErrorKind::NotFound,
            IdentityError::InvalidPassword | IdentityError::InvalidToken(_) => {
                ErrorKind::Unauthorized
            }
            IdentityError::Cancelled => ErrorKind::ClientClosedRequest,
            IdentityError::DeadlineExceeded => ErrorKind::RequestTimeout,
            IdentityError::InvalidInput(_) => ErrorKind::BadRequest,
            IdentityError::Forbidden => ErrorKind::Forbidden,
            IdentityError::Hashing(_) | IdentityError::Store(_) | IdentityError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Failures the caller cannot fix; details stay in the logs
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            IdentityError::Hashing(_) | IdentityError::Store(_) | IdentityError::Internal(_)
        )
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        if self.is_internal() {
            return AppError::internal("Internal server error").with_code(self.code());
        }
        AppError::new(self.kind(), self.to_string()).with_code(self.code())
    }

    /// Login must not reveal whether the email is registered
    pub fn into_login_app_error(self) -> AppError {
        if matches!(
            self,
            IdentityError::AccountNotFound | IdentityError::InvalidPassword
        ) {
            tracing::info!(reason = self.code(), "Login rejected");
            return AppError::unauthorized("Invalid email or password")
                .with_code("invalid_credentials");
        }
        self.log();
        self.to_app_error()
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            IdentityError::Store(e) => {
                tracing::error!(error = %e, "Account store error");
            }
            IdentityError::Hashing(e) => {
                tracing::error!(error = %e, "Password hashing error");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            IdentityError::InvalidToken(e) => {
                tracing::info!(reason = %e, "Token rejected");
            }
            IdentityError::Forbidden => {
                tracing::info!("Cross-account modification rejected");
            }
            _ => {
                tracing::debug!(error = %self, code = self.code(), "Identity error");
            }
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<StoreError> for IdentityError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation => IdentityError::AccountAlreadyExists,
            StoreError::NotFound => IdentityError::AccountNotFound,
            other => IdentityError::Store(other),
        }
    }
}

impl From<BearerError> for IdentityError {
    fn from(_: BearerError) -> Self {
        IdentityError::InvalidToken(TokenError::Malformed)
    }
}
