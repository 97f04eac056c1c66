//! Password Hashing and Verification
//!
//! One-way password storage with:
//! - Argon2id hashing with a pinned work factor
//! - Random per-hash salt (PHC string output)
//! - Zeroization of clear text
//! - Constant-time comparison (inside argon2)
//! - Optional application-wide pepper
//!
//! Hashing is deliberately expensive. Async callers should run it on a
//! blocking thread.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::{self, SaltString},
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants
// ============================================================================

/// Maximum password length in Unicode scalar values
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Argon2id memory cost in KiB (19 MiB)
pub const ARGON2_MEMORY_KIB: u32 = 19 * 1024;

/// Argon2id iterations
pub const ARGON2_ITERATIONS: u32 = 2;

/// Argon2id lanes
pub const ARGON2_PARALLELISM: u32 = 1;

// ============================================================================
// Error Types
// ============================================================================

/// Password hashing/verification errors
///
/// A wrong password is not an error: [`PasswordHasher::verify`] returns
/// `Ok(false)` for that.
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Plain text exceeds [`MAX_PASSWORD_LENGTH`]
    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// The argon2 primitive refused to hash
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored digest is not a PHC string argon2 can read
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
///
/// ## Examples
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// let password = ClearTextPassword::new("correct horse battery staple");
/// assert_eq!(format!("{password:?}"), "ClearTextPassword(\"[REDACTED]\")");
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Wrap user input.
    ///
    /// Unicode is NFKC-normalized so that visually identical input typed on
    /// different keyboards hashes the same.
    pub fn new(raw: impl Into<String>) -> Self {
        let mut raw = raw.into();
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();
        Self(normalized)
    }

    /// Number of Unicode scalar values
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Vec<u8> {
        let mut bytes = self.0.as_bytes().to_vec();
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        bytes
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The string carries algorithm, version, parameters, salt and hash, so a
/// digest made with older parameters still verifies.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Hasher
// ============================================================================

/// Argon2id password hasher with a fixed work factor
///
/// ## Examples
/// ```rust
/// use platform::password::{ClearTextPassword, PasswordHasher};
///
/// let hasher = PasswordHasher::new(None);
/// let password = ClearTextPassword::new("hunter2hunter2");
/// let digest = hasher.hash(&password)?;
/// assert!(hasher.verify(&digest, &password)?);
/// # Ok::<(), platform::password::PasswordHashError>(())
/// ```
#[derive(Clone)]
pub struct PasswordHasher {
    pepper: Option<Vec<u8>>,
}

impl PasswordHasher {
    /// Create a hasher. The pepper, if any, must be the same for hashing
    /// and verifying.
    pub fn new(pepper: Option<Vec<u8>>) -> Self {
        Self { pepper }
    }

    fn argon2() -> Result<Argon2<'static>, PasswordHashError> {
        let params = Params::new(
            ARGON2_MEMORY_KIB,
            ARGON2_ITERATIONS,
            ARGON2_PARALLELISM,
            None,
        )
        .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        let actual = password.char_count();
        if actual > MAX_PASSWORD_LENGTH {
            return Err(PasswordHashError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual,
            });
        }

        let mut bytes = password.peppered(self.pepper.as_deref());
        let salt = SaltString::generate(OsRng);
        let result = Self::argon2()?
            .hash_password(&bytes, &salt)
            .map(|hash| HashedPassword {
                hash: hash.to_string(),
            })
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()));
        bytes.zeroize();
        result
    }

    /// Verify a password against a stored digest
    ///
    /// Returns `Ok(false)` on mismatch. Errors only when the digest itself
    /// cannot be used.
    pub fn verify(
        &self,
        digest: &HashedPassword,
        password: &ClearTextPassword,
    ) -> Result<bool, PasswordHashError> {
        // Nothing longer than the limit was ever hashed.
        if password.char_count() > MAX_PASSWORD_LENGTH {
            return Ok(false);
        }

        let parsed =
            PasswordHash::new(&digest.hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;

        let mut bytes = password.peppered(self.pepper.as_deref());
        let outcome = Self::argon2()?.verify_password(&bytes, &parsed);
        bytes.zeroize();

        match outcome {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(PasswordHashError::InvalidHashFormat),
        }
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
