//! Account Entity
//!
//! A registered identity: profile fields plus the password hash.

use std::fmt;

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::password::HashedPassword;

use crate::domain::email::Email;
use crate::error::{IdentityError, IdentityResult};

/// Maximum length of `name` / `surname`
pub const NAME_MAX_LENGTH: usize = 100;

/// Maximum length of a phone number
pub const PHONE_MAX_LENGTH: usize = 32;

/// Account entity
///
/// `password_hash` is a PHC string and prints as `[HASH]` in `Debug`.
#[derive(Debug, Clone)]
pub struct Account {
    /// Internal UUID identifier, also the token subject
    pub id: AccountId,
    /// Login key (unique)
    pub email: Email,
    pub name: String,
    pub surname: String,
    pub phone: Option<String>,
    pub password_hash: HashedPassword,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a fresh id
    pub fn new(
        email: Email,
        name: String,
        surname: String,
        phone: Option<String>,
        password_hash: HashedPassword,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccountId::new(),
            email,
            name,
            surname,
            phone,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Profile changes; `None` leaves a field as it is
#[derive(Default, Clone)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for AccountPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountPatch")
            .field("name", &self.name)
            .field("surname", &self.surname)
            .field("phone", &self.phone)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.password.is_none()
    }
}

/// Trimmed, non-empty, bounded name
pub fn validate_name(field: &str, value: &str) -> IdentityResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(IdentityError::InvalidInput(format!("{field} cannot be empty")));
    }
    if value.chars().count() > NAME_MAX_LENGTH {
        return Err(IdentityError::InvalidInput(format!(
            "{field} must be at most {NAME_MAX_LENGTH} characters"
        )));
    }
    Ok(value.to_string())
}

/// Blank means "no phone"; otherwise digits with common separators
pub fn validate_phone(value: Option<&str>) -> IdentityResult<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.len() > PHONE_MAX_LENGTH {
        return Err(IdentityError::InvalidInput(format!(
            "Phone must be at most {PHONE_MAX_LENGTH} characters"
        )));
    }
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')');
    if !value.chars().all(allowed) || !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(IdentityError::InvalidInput("Invalid phone number".to_string()));
    }
    Ok(Some(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash() -> HashedPassword {
        HashedPassword::from_phc_string(
            "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$iWh06vD8Fy27wf9npn6FXWiCX4K6pW6Ue1Bnzz07Z8A",
        )
        .unwrap()
    }

    #[test]
    fn test_new_account() {
        let now = Utc::now();
        let account = Account::new(
            Email::new("ann@example.com").unwrap(),
            "Ann".into(),
            "Lee".into(),
            None,
            hash(),
            now,
        );
        assert_eq!(account.created_at, now);
        assert_eq!(account.updated_at, now);
        assert_ne!(account.id, AccountId::new());
    }

    #[test]
    fn test_debug_hides_hash() {
        let account = Account::new(
            Email::new("ann@example.com").unwrap(),
            "Ann".into(),
            "Lee".into(),
            None,
            hash(),
            Utc::now(),
        );
        let debug = format!("{:?}", account);
        assert!(!debug.contains("argon2id"));
        assert!(debug.contains("ann@example.com"));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("Name", "  Ann ").unwrap(), "Ann");
        assert!(validate_name("Name", "   ").is_err());
        assert!(validate_name("Name", &"x".repeat(NAME_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone(None).unwrap(), None);
        assert_eq!(validate_phone(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_phone(Some("+1 (555) 010-9999")).unwrap().as_deref(),
            Some("+1 (555) 010-9999")
        );
        assert!(validate_phone(Some("call me")).is_err());
        assert!(validate_phone(Some("---")).is_err());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(AccountPatch::default().is_empty());
        let patch = AccountPatch {
            name: Some("Bo".into()),
            ..Default::default()
        };
        assert!(!patch.is_empty());

        let patch = AccountPatch {
            password: Some("hunter2hunter2".into()),
            ..Default::default()
        };
        assert!(!format!("{:?}", patch).contains("hunter2"));
    }
}
