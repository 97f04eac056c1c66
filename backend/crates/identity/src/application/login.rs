//! Login
//!
//! Checks credentials and issues a token pair.

use kernel::id::AccountId;
use platform::password::ClearTextPassword;

use crate::application::context::RequestContext;
use crate::application::service::CredentialService;
use crate::application::tokens::TokenPair;
use crate::domain::email::Email;
use crate::domain::repository::{AccountFilter, AccountRepository};
use crate::error::{IdentityError, IdentityResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login output
#[derive(Debug, Clone)]
pub struct LoginOutput {
    pub tokens: TokenPair,
    pub account_id: AccountId,
}

impl<R> CredentialService<R>
where
    R: AccountRepository,
{
    /// `AccountNotFound` / `InvalidPassword` stay distinct here; the HTTP
    /// layer folds them into one response.
    pub async fn login(&self, ctx: &RequestContext, input: LoginInput) -> IdentityResult<LoginOutput> {
        let password = ClearTextPassword::new(input.password);

        // A malformed email cannot belong to any account
        let account = match Email::new(&input.email) {
            Ok(email) => self.find_account(ctx, AccountFilter::by_email(email)).await?,
            Err(_) => None,
        };

        let Some(account) = account else {
            self.verify_password(ctx, None, password).await?;
            tracing::info!("Login failed: account not found");
            return Err(IdentityError::AccountNotFound);
        };

        let matched = self
            .verify_password(ctx, Some(account.password_hash.clone()), password)
            .await?;
        if !matched {
            tracing::info!(account_id = %account.id, "Login failed: invalid password");
            return Err(IdentityError::InvalidPassword);
        }

        let tokens = self.issue_token_pair(&account)?;

        tracing::info!(account_id = %account.id, "Account logged in");

        Ok(LoginOutput {
            tokens,
            account_id: account.id,
        })
    }
}
