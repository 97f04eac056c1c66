//! Repository Traits
//!
//! Interface for account persistence. Implementations live in the
//! infrastructure layer.

use kernel::id::AccountId;
use thiserror::Error;

use crate::domain::account::Account;
use crate::domain::email::Email;

pub type StoreResult<T> = Result<T, StoreError>;

/// Account store failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint hit (email taken)
    #[error("Unique constraint violated")]
    UniqueViolation,

    /// Target row does not exist
    #[error("Record not found")]
    NotFound,

    /// Anything else from the backend
    #[error("{0}")]
    Backend(String),
}

/// Lookup criteria; set fields are ANDed, an empty filter matches nothing
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub id: Option<AccountId>,
    pub email: Option<Email>,
}

impl AccountFilter {
    pub fn by_id(id: AccountId) -> Self {
        Self {
            id: Some(id),
            email: None,
        }
    }

    pub fn by_email(email: Email) -> Self {
        Self {
            id: None,
            email: Some(email),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.email.is_none()
    }

    pub fn matches(&self, account: &Account) -> bool {
        if self.is_empty() {
            return false;
        }
        self.id.is_none_or(|id| id == account.id)
            && self.email.as_ref().is_none_or(|email| *email == account.email)
    }
}

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Find the account matching the filter
    async fn find(&self, filter: &AccountFilter) -> StoreResult<Option<Account>>;

    /// Insert a new account; `UniqueViolation` if the email is taken
    async fn create(&self, account: &Account) -> StoreResult<Account>;

    /// Replace the account stored under `id`
    async fn update(&self, id: &AccountId, account: &Account) -> StoreResult<Account>;

    /// Delete the account; `NotFound` if absent
    async fn delete(&self, id: &AccountId) -> StoreResult<()>;
}
