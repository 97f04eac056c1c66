//! Identity Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Account entity, value objects, repository trait
//! - `application/` - Credential service, configuration, request context
//! - `infra/` - PostgreSQL and in-memory account stores
//! - `presentation/` - HTTP handlers, DTOs, router, bearer middleware
//!
//! ## Features
//! - Account registration with email + password
//! - Login issuing an access/refresh token pair
//! - Stateless token verification and refresh
//! - Profile read/update/delete for the token holder
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (pinned parameters, optional pepper)
//! - Tokens signed with HMAC-SHA256; valid only inside `[nbf, exp)`
//! - No server-side session state; a token is valid until it expires

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::IdentityConfig;
pub use application::context::RequestContext;
pub use application::service::CredentialService;
pub use error::{IdentityError, IdentityResult};
pub use infra::{memory::InMemoryAccountRepository, postgres::PgAccountRepository};
pub use presentation::router::identity_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
