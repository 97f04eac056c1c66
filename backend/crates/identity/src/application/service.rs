//! Credential Service
//!
//! Registers accounts, checks credentials and issues/verifies/refreshes
//! bearer tokens. The operations themselves live in the sibling modules
//! (`register`, `login`, `tokens`, `account`); this file holds the shared
//! state and the suspension-point helpers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::clock::{Clock, SystemClock};
use platform::password::{ClearTextPassword, HashedPassword, MAX_PASSWORD_LENGTH, PasswordHasher};
use platform::token::TokenCodec;
use tokio_util::sync::CancellationToken;

use crate::application::config::IdentityConfig;
use crate::application::context::RequestContext;
use crate::domain::account::Account;
use crate::domain::repository::{AccountFilter, AccountRepository};
use crate::error::{IdentityError, IdentityResult};

const DECOY_PASSWORD: &str = "decoy-password-never-matches";

/// Credential service
///
/// Cheap to clone; every field is shared.
pub struct CredentialService<R>
where
    R: AccountRepository,
{
    pub(crate) repo: Arc<R>,
    pub(crate) config: Arc<IdentityConfig>,
    pub(crate) codec: Arc<TokenCodec>,
    hasher: Arc<PasswordHasher>,
    /// Verified against when the account does not exist, so that branch
    /// costs one Argon2 verification like the real one
    decoy: Arc<Option<HashedPassword>>,
    clock: Arc<dyn Clock>,
    /// Parent of every request's cancellation token
    shutdown: CancellationToken,
}

impl<R> Clone for CredentialService<R>
where
    R: AccountRepository,
{
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            config: Arc::clone(&self.config),
            codec: Arc::clone(&self.codec),
            hasher: Arc::clone(&self.hasher),
            decoy: Arc::clone(&self.decoy),
            clock: Arc::clone(&self.clock),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<R> CredentialService<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        let hasher = PasswordHasher::new(config.password_pepper.clone());
        let codec = TokenCodec::new(config.token_secret.clone(), Some(config.issuer.clone()));
        let decoy = match hasher.hash(&ClearTextPassword::new(DECOY_PASSWORD)) {
            Ok(decoy) => Some(decoy),
            Err(e) => {
                tracing::error!(error = %e, "Failed to prepare decoy password hash");
                None
            }
        };

        Self {
            repo,
            config,
            codec: Arc::new(codec),
            hasher: Arc::new(hasher),
            decoy: Arc::new(decoy),
            clock: Arc::new(SystemClock),
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancel in-flight requests when `shutdown` fires
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Replace the wall clock (tests pin time with `ManualClock`)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Fresh context carrying the configured request timeout, cancelled on
    /// shutdown
    pub fn request_context(&self) -> RequestContext {
        let ctx = RequestContext::new().with_cancellation(self.shutdown.child_token());
        match self.config.request_timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }

    // ========================================================================
    // Suspension points
    // ========================================================================

    pub(crate) async fn find_account(
        &self,
        ctx: &RequestContext,
        filter: AccountFilter,
    ) -> IdentityResult<Option<Account>> {
        ctx.run(async { Ok::<_, IdentityError>(self.repo.find(&filter).await?) }).await
    }

    /// Argon2 on the blocking pool
    pub(crate) async fn hash_password(
        &self,
        ctx: &RequestContext,
        password: ClearTextPassword,
    ) -> IdentityResult<HashedPassword> {
        let hasher = Arc::clone(&self.hasher);
        ctx.run(async move {
            let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password))
                .await
                .map_err(|e| IdentityError::Internal(format!("Hashing task failed: {e}")))??;
            Ok::<_, IdentityError>(hashed)
        })
        .await
    }

    /// Check `password` against `digest`; with no digest, burn one
    /// verification against the decoy and report a mismatch.
    pub(crate) async fn verify_password(
        &self,
        ctx: &RequestContext,
        digest: Option<HashedPassword>,
        password: ClearTextPassword,
    ) -> IdentityResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let decoy = Arc::clone(&self.decoy);
        ctx.run(async move {
            let matched = tokio::task::spawn_blocking(move || match digest {
                Some(digest) => hasher.verify(&digest, &password),
                None => {
                    if let Some(decoy) = &*decoy {
                        let _ = hasher.verify(decoy, &password);
                    }
                    Ok(false)
                }
            })
            .await
            .map_err(|e| IdentityError::Internal(format!("Verification task failed: {e}")))??;
            Ok::<_, IdentityError>(matched)
        })
        .await
    }
}

/// Non-empty and within the hasher's length limit
pub(crate) fn validate_password(password: &ClearTextPassword) -> IdentityResult<()> {
    if password.is_empty() {
        return Err(IdentityError::InvalidInput("Password cannot be empty".to_string()));
    }
    if password.char_count() > MAX_PASSWORD_LENGTH {
        return Err(IdentityError::InvalidInput(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
