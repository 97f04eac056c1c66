//! Domain Layer
//!
//! Contains the account entity, value objects, and the repository trait.

pub mod account;
pub mod email;
pub mod repository;

// Re-exports
pub use account::{Account, AccountPatch};
pub use email::Email;
pub use repository::{AccountFilter, AccountRepository, StoreError, StoreResult};
