//! In-Memory Account Store
//!
//! Same contract as the PostgreSQL store, including email uniqueness.
//! Used by tests and local runs without a database.

use std::collections::HashMap;

use kernel::id::AccountId;
use tokio::sync::RwLock;

use crate::domain::account::Account;
use crate::domain::repository::{AccountFilter, AccountRepository, StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

impl AccountRepository for InMemoryAccountRepository {
    async fn find(&self, filter: &AccountFilter) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| filter.matches(a)).cloned())
    }

    async fn create(&self, account: &Account) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        let email_taken = accounts.values().any(|a| a.email == account.email);
        if email_taken || accounts.contains_key(&account.id) {
            return Err(StoreError::UniqueViolation);
        }
        accounts.insert(account.id, account.clone());
        Ok(account.clone())
    }

    async fn update(&self, id: &AccountId, account: &Account) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        if !accounts.contains_key(id) {
            return Err(StoreError::NotFound);
        }
        let email_taken = accounts
            .values()
            .any(|a| a.id != *id && a.email == account.email);
        if email_taken {
            return Err(StoreError::UniqueViolation);
        }

        let mut stored = account.clone();
        stored.id = *id;
        accounts.insert(*id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: &AccountId) -> StoreResult<()> {
        self.accounts
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
