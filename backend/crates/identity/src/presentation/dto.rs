//! API DTOs (Data Transfer Objects)
//!
//! Request types carrying a password deliberately have no `Debug`.

use serde::{Deserialize, Serialize};

use crate::application::{LoginOutput, RegisterInput, TokenPair};
use crate::domain::account::{Account, AccountPatch};

// ============================================================================
// Register
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            surname: req.surname,
            email: req.email,
            password: req.password,
            phone: req.phone,
        }
    }
}

// ============================================================================
// Login / Tokens
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token pair; expiry times in unix milliseconds
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub access_token_expires_at_ms: i64,
    pub refresh_token_expires_at_ms: i64,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token_expires_at_ms: pair.access_expires_at.timestamp_millis(),
            refresh_token_expires_at_ms: pair.refresh_expires_at.timestamp_millis(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer",
        }
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub tokens: TokenPairResponse,
}

impl From<LoginOutput> for LoginResponse {
    fn from(output: LoginOutput) -> Self {
        Self {
            user_id: output.account_id.to_string(),
            tokens: output.tokens.into(),
        }
    }
}

// ============================================================================
// Account
// ============================================================================

/// Public account view (never includes the password hash)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub phone: Option<String>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.into_db(),
            name: account.name,
            surname: account.surname,
            phone: account.phone,
            created_at_ms: account.created_at.timestamp_millis(),
            updated_at_ms: account.updated_at.timestamp_millis(),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateAccountRequest> for AccountPatch {
    fn from(req: UpdateAccountRequest) -> Self {
        Self {
            name: req.name,
            surname: req.surname,
            phone: req.phone,
            email: req.email,
            password: req.password,
        }
    }
}
