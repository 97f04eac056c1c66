//! Account Operations
//!
//! Read, update and delete an existing account.

use kernel::id::AccountId;
use platform::password::ClearTextPassword;

use crate::application::context::RequestContext;
use crate::application::service::{CredentialService, validate_password};
use crate::domain::account::{Account, AccountPatch, validate_name, validate_phone};
use crate::domain::email::Email;
use crate::domain::repository::{AccountFilter, AccountRepository};
use crate::error::{IdentityError, IdentityResult};

impl<R> CredentialService<R>
where
    R: AccountRepository,
{
    pub async fn get_user(&self, ctx: &RequestContext, id: &AccountId) -> IdentityResult<Account> {
        self.find_account(ctx, AccountFilter::by_id(*id))
            .await?
            .ok_or(IdentityError::AccountNotFound)
    }

    pub async fn get_user_by_email(&self, ctx: &RequestContext, email: &str) -> IdentityResult<Account> {
        let email = Email::new(email)?;
        self.find_account(ctx, AccountFilter::by_email(email))
            .await?
            .ok_or(IdentityError::AccountNotFound)
    }

    /// Apply `patch` and bump `updated_at`. An empty patch is a no-op read.
    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        id: &AccountId,
        patch: AccountPatch,
    ) -> IdentityResult<Account> {
        let mut account = self.get_user(ctx, id).await?;
        if patch.is_empty() {
            return Ok(account);
        }

        if let Some(name) = &patch.name {
            account.name = validate_name("Name", name)?;
        }
        if let Some(surname) = &patch.surname {
            account.surname = validate_name("Surname", surname)?;
        }
        if let Some(phone) = &patch.phone {
            account.phone = validate_phone(Some(phone))?;
        }
        if let Some(email) = &patch.email {
            let email = Email::new(email)?;
            if email != account.email {
                let taken = self
                    .find_account(ctx, AccountFilter::by_email(email.clone()))
                    .await?
                    .is_some_and(|other| other.id != account.id);
                if taken {
                    return Err(IdentityError::AccountAlreadyExists);
                }
                account.email = email;
            }
        }
        if let Some(password) = patch.password {
            let password = ClearTextPassword::new(password);
            validate_password(&password)?;
            account.password_hash = self.hash_password(ctx, password).await?;
        }
        account.updated_at = self.now();

        let updated = ctx
            .run(async { Ok::<_, IdentityError>(self.repo.update(id, &account).await?) })
            .await?;

        tracing::info!(account_id = %updated.id, "Account updated");

        Ok(updated)
    }

    pub async fn delete_user(&self, ctx: &RequestContext, id: &AccountId) -> IdentityResult<()> {
        self.get_user(ctx, id).await?;
        ctx.run(async { Ok::<_, IdentityError>(self.repo.delete(id).await?) }).await?;

        tracing::info!(account_id = %id, "Account deleted");

        Ok(())
    }
}
