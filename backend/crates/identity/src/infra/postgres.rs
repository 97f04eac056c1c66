//! PostgreSQL Account Store

use chrono::{DateTime, Utc};
use kernel::error::conversions::is_unique_violation;
use kernel::id::AccountId;
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::account::Account;
use crate::domain::email::Email;
use crate::domain::repository::{AccountFilter, AccountRepository, StoreError, StoreResult};

const ACCOUNT_COLUMNS: &str =
    "id, email, name, surname, phone, password_hash, created_at, updated_at";

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            StoreError::UniqueViolation
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

impl AccountRepository for PgAccountRepository {
    async fn find(&self, filter: &AccountFilter) -> StoreResult<Option<Account>> {
        if filter.is_empty() {
            return Ok(None);
        }

        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE ($1::uuid IS NULL OR id = $1) \
               AND ($2::text IS NULL OR email = $2)"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(filter.id.map(AccountId::into_uuid))
            .bind(filter.email.as_ref().map(Email::as_str))
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn create(&self, account: &Account) -> StoreResult<Account> {
        let sql = format!(
            r#"
            INSERT INTO accounts (
                id,
                email,
                name,
                surname,
                phone,
                password_hash,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account.id.into_uuid())
            .bind(account.email.as_str())
            .bind(&account.name)
            .bind(&account.surname)
            .bind(account.phone.as_deref())
            .bind(account.password_hash.as_phc_string())
            .bind(account.created_at)
            .bind(account.updated_at)
            .fetch_one(&self.pool)
            .await?;

        row.into_account()
    }

    async fn update(&self, id: &AccountId, account: &Account) -> StoreResult<Account> {
        let sql = format!(
            r#"
            UPDATE accounts SET
                email = $2,
                name = $3,
                surname = $4,
                phone = $5,
                password_hash = $6,
                updated_at = $7
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.into_uuid())
            .bind(account.email.as_str())
            .bind(&account.name)
            .bind(&account.surname)
            .bind(account.phone.as_deref())
            .bind(account.password_hash.as_phc_string())
            .bind(account.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(StoreError::NotFound)?.into_account()
    }

    async fn delete(&self, id: &AccountId) -> StoreResult<()> {
        let deleted = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.into_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    name: String,
    surname: String,
    phone: Option<String>,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> StoreResult<Account> {
        let password_hash = HashedPassword::from_phc_string(self.password_hash).map_err(|_| {
            StoreError::Backend(format!("Stored password hash for {} is corrupt", self.id))
        })?;

        Ok(Account {
            id: AccountId::from_uuid(self.id),
            email: Email::from_db(self.email),
            name: self.name,
            surname: self.surname,
            phone: self.phone,
            password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
