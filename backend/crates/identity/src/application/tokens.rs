//! Token Lifecycle
//!
//! Issue, verify and refresh bearer tokens.

use std::fmt;

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::token::{TokenClaims, TokenError};

use crate::application::context::RequestContext;
use crate::application::service::CredentialService;
use crate::domain::account::Account;
use crate::domain::repository::{AccountFilter, AccountRepository};
use crate::error::{IdentityError, IdentityResult};

/// Access + refresh token for one subject
#[derive(Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("access_expires_at", &self.access_expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish()
    }
}

impl<R> CredentialService<R>
where
    R: AccountRepository,
{
    /// Sign an access and a refresh token for `account`
    pub fn issue_token_pair(&self, account: &Account) -> IdentityResult<TokenPair> {
        let now = self.now();
        let subject = account.id.to_string();
        let access_lifetime = self
            .config
            .access_token_lifetime()
            .ok_or(TokenError::InvalidLifetime)
            .map_err(issuance_error)?;
        let refresh_lifetime = self
            .config
            .refresh_token_lifetime()
            .ok_or(TokenError::InvalidLifetime)
            .map_err(issuance_error)?;

        let access = TokenClaims::new(&self.config.issuer, &subject, now, access_lifetime)
            .map_err(issuance_error)?;
        let refresh = TokenClaims::new(&self.config.issuer, &subject, now, refresh_lifetime)
            .map_err(issuance_error)?;

        Ok(TokenPair {
            access_token: self.codec.sign(&access).map_err(issuance_error)?,
            refresh_token: self.codec.sign(&refresh).map_err(issuance_error)?,
            access_expires_at: expiry(&access)?,
            refresh_expires_at: expiry(&refresh)?,
        })
    }

    /// Resolve a bearer token to its account
    pub async fn verify(&self, ctx: &RequestContext, token: &str) -> IdentityResult<Account> {
        let claims = self.codec.verify(token, self.now())?;
        let account_id: AccountId = claims
            .sub
            .parse()
            .map_err(|_| IdentityError::InvalidToken(TokenError::Malformed))?;

        self.find_account(ctx, AccountFilter::by_id(account_id))
            .await?
            .ok_or(IdentityError::AccountNotFound)
    }

    /// New pair for the holder of a valid refresh token.
    ///
    /// The presented token stays valid until its own expiry.
    pub async fn refresh(&self, ctx: &RequestContext, refresh_token: &str) -> IdentityResult<TokenPair> {
        let account = self.verify(ctx, refresh_token).await?;
        let tokens = self.issue_token_pair(&account)?;

        tracing::info!(account_id = %account.id, "Tokens refreshed");

        Ok(tokens)
    }
}

fn expiry(claims: &TokenClaims) -> IdentityResult<DateTime<Utc>> {
    claims
        .expires_at()
        .ok_or(TokenError::InvalidLifetime)
        .map_err(issuance_error)
}

fn issuance_error(err: TokenError) -> IdentityError {
    IdentityError::Internal(format!("Token issuance failed: {err}"))
}
