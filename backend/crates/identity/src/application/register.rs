//! Register
//!
//! Creates a new account.

use platform::password::ClearTextPassword;

use crate::application::context::RequestContext;
use crate::application::service::{CredentialService, validate_password};
use crate::domain::account::{Account, validate_name, validate_phone};
use crate::domain::email::Email;
use crate::domain::repository::{AccountFilter, AccountRepository};
use crate::error::{IdentityError, IdentityResult};

/// Register input
pub struct RegisterInput {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

impl<R> CredentialService<R>
where
    R: AccountRepository,
{
    /// Validate, reject a taken email, hash and persist.
    ///
    /// The lookup is only a fast path; a concurrent registration that
    /// slips past it hits the store's unique constraint instead, which
    /// surfaces as the same `AccountAlreadyExists`.
    pub async fn register(&self, ctx: &RequestContext, input: RegisterInput) -> IdentityResult<()> {
        let email = Email::new(&input.email)?;
        let name = validate_name("Name", &input.name)?;
        let surname = validate_name("Surname", &input.surname)?;
        let phone = validate_phone(input.phone.as_deref())?;
        let password = ClearTextPassword::new(input.password);
        validate_password(&password)?;

        let existing = self
            .find_account(ctx, AccountFilter::by_email(email.clone()))
            .await?;
        if existing.is_some() {
            tracing::info!("Registration rejected: email already registered");
            return Err(IdentityError::AccountAlreadyExists);
        }

        let password_hash = self.hash_password(ctx, password).await?;
        let account = Account::new(email, name, surname, phone, password_hash, self.now());

        let created = ctx
            .run(async { Ok::<_, IdentityError>(self.repo.create(&account).await?) })
            .await?;

        tracing::info!(account_id = %created.id, "Account registered");

        Ok(())
    }
}
