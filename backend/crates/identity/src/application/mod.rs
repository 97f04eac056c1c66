//! Application Layer
//!
//! The credential service and what it needs to run: configuration and the
//! per-request cancellation context.

pub mod account;
pub mod config;
pub mod context;
pub mod login;
pub mod register;
pub mod service;
pub mod tokens;

// Re-exports
pub use config::IdentityConfig;
pub use context::RequestContext;
pub use login::{LoginInput, LoginOutput};
pub use register::RegisterInput;
pub use service::CredentialService;
pub use tokens::TokenPair;
