//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary every other crate agrees on:
//! - The application error type, its classification and result alias
//! - Typed identifiers for domain entities
//!
//! Nothing in here knows about accounts, passwords or tokens.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
