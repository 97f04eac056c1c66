//! Infrastructure Layer
//!
//! Account store implementations.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAccountRepository;
pub use postgres::PgAccountRepository;
