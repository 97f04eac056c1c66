//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations for the identity service:
//! - Cryptographic utilities (HMAC-SHA256, Base64url, random bytes)
//! - Password hashing (Argon2id with pinned parameters)
//! - Signed bearer tokens (HS256)
//! - Clock abstraction and Authorization header parsing

pub mod bearer;
pub mod clock;
pub mod crypto;
pub mod password;
pub mod token;
