//! End-to-end credential lifecycle against the in-memory store.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, TimeZone, Utc};
use identity::application::{LoginInput, LoginOutput, RegisterInput};
use identity::domain::account::{Account, AccountPatch};
use identity::domain::repository::{AccountFilter, AccountRepository, StoreResult};
use identity::{
    CredentialService, IdentityConfig, IdentityError, InMemoryAccountRepository, RequestContext,
};
use kernel::id::AccountId;
use platform::clock::{Clock, ManualClock};
use platform::token::{TokenError, TokenSecret};

// ============================================================================
// Fixtures
// ============================================================================

struct Harness {
    service: CredentialService<InMemoryAccountRepository>,
    repo: Arc<InMemoryAccountRepository>,
    clock: Arc<ManualClock>,
    ctx: RequestContext,
}

fn config() -> IdentityConfig {
    IdentityConfig {
        issuer: "identity-test".to_string(),
        access_token_ttl: StdDuration::from_secs(15 * 60),
        refresh_token_ttl: StdDuration::from_secs(24 * 3600),
        request_timeout: None,
        ..IdentityConfig::with_secret(TokenSecret::new(vec![11u8; 32]).unwrap())
    }
}

fn harness() -> Harness {
    let repo = Arc::new(InMemoryAccountRepository::new());
    let clock = Arc::new(ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
    let service = CredentialService::new(Arc::clone(&repo), Arc::new(config()))
        .with_clock(clock.clone());

    Harness {
        service,
        repo,
        clock,
        ctx: RequestContext::new(),
    }
}

fn registration(email: &str, password: &str) -> RegisterInput {
    RegisterInput {
        name: "Ada".to_string(),
        surname: "Lovelace".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        phone: None,
    }
}

fn credentials(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email: email.to_string(),
        password: password.to_string(),
    }
}

impl Harness {
    async fn register_and_login(&self, email: &str, password: &str) -> LoginOutput {
        self.service
            .register(&self.ctx, registration(email, password))
            .await
            .unwrap();
        self.service
            .login(&self.ctx, credentials(email, password))
            .await
            .unwrap()
    }
}

// ============================================================================
// Register / Login
// ============================================================================

#[tokio::test]
async fn register_login_verify_scenario() {
    let h = harness();

    h.service
        .register(&h.ctx, registration("a@x.com", "pw1"))
        .await
        .unwrap();

    let out = h
        .service
        .login(&h.ctx, credentials("a@x.com", "pw1"))
        .await
        .unwrap();
    assert!(!out.tokens.access_token.is_empty());
    assert!(!out.tokens.refresh_token.is_empty());
    assert_ne!(out.tokens.access_token, out.tokens.refresh_token);

    let account = h.service.verify(&h.ctx, &out.tokens.access_token).await.unwrap();
    assert_eq!(account.id, out.account_id);
    assert_eq!(account.email.as_str(), "a@x.com");

    let wrong = h.service.login(&h.ctx, credentials("a@x.com", "wrong")).await;
    assert!(matches!(wrong, Err(IdentityError::InvalidPassword)));
}

#[tokio::test]
async fn stored_hash_is_not_the_password() {
    let h = harness();
    h.register_and_login("ada@example.com", "s3cret-pass").await;

    let account = h.service.get_user_by_email(&h.ctx, "ada@example.com").await.unwrap();
    assert_ne!(account.password_hash.as_phc_string(), "s3cret-pass");
    assert!(account.password_hash.as_phc_string().starts_with("$argon2id$"));
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let h = harness();
    h.service
        .register(&h.ctx, registration("ada@example.com", "first-pass"))
        .await
        .unwrap();

    let again = h
        .service
        .register(&h.ctx, registration("ada@example.com", "second-pass"))
        .await;
    assert!(matches!(again, Err(IdentityError::AccountAlreadyExists)));

    let other_case = h
        .service
        .register(&h.ctx, registration("ADA@Example.com", "third-pass"))
        .await;
    assert!(matches!(other_case, Err(IdentityError::AccountAlreadyExists)));

    assert_eq!(h.repo.len().await, 1);
}

#[tokio::test]
async fn concurrent_registration_creates_one_account() {
    let h = harness();

    let (first, second) = tokio::join!(
        h.service.register(&h.ctx, registration("race@example.com", "pass-one")),
        h.service.register(&h.ctx, registration("race@example.com", "pass-two")),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(IdentityError::AccountAlreadyExists)))
    );
    assert_eq!(h.repo.len().await, 1);
}

#[tokio::test]
async fn registration_validates_input() {
    let h = harness();

    let bad_email = h.service.register(&h.ctx, registration("not-an-email", "pw")).await;
    assert!(matches!(bad_email, Err(IdentityError::InvalidInput(_))));

    let empty_password = h.service.register(&h.ctx, registration("ada@example.com", "")).await;
    assert!(matches!(empty_password, Err(IdentityError::InvalidInput(_))));

    let mut blank_name = registration("ada@example.com", "pw");
    blank_name.name = "   ".to_string();
    assert!(matches!(
        h.service.register(&h.ctx, blank_name).await,
        Err(IdentityError::InvalidInput(_))
    ));

    assert!(h.repo.is_empty().await);
}

#[tokio::test]
async fn login_unknown_email_is_not_found() {
    let h = harness();
    h.register_and_login("ada@example.com", "s3cret-pass").await;

    let unknown = h
        .service
        .login(&h.ctx, credentials("bob@example.com", "s3cret-pass"))
        .await;
    assert!(matches!(unknown, Err(IdentityError::AccountNotFound)));

    let malformed = h.service.login(&h.ctx, credentials("bob", "s3cret-pass")).await;
    assert!(matches!(malformed, Err(IdentityError::AccountNotFound)));
}

#[tokio::test]
async fn login_email_is_case_insensitive() {
    let h = harness();
    let first = h.register_and_login("ada@example.com", "s3cret-pass").await;

    let again = h
        .service
        .login(&h.ctx, credentials("  Ada@Example.COM ", "s3cret-pass"))
        .await
        .unwrap();
    assert_eq!(again.account_id, first.account_id);
}

// ============================================================================
// Tokens
// ============================================================================

#[tokio::test]
async fn token_pair_shares_subject_with_independent_expiry() {
    let h = harness();
    let out = h.register_and_login("ada@example.com", "s3cret-pass").await;

    let now = h.clock.now();
    assert_eq!(out.tokens.access_expires_at, now + Duration::minutes(15));
    assert_eq!(out.tokens.refresh_expires_at, now + Duration::hours(24));

    let access = h.service.verify(&h.ctx, &out.tokens.access_token).await.unwrap();
    let refresh = h.service.verify(&h.ctx, &out.tokens.refresh_token).await.unwrap();
    assert_eq!(access.id, refresh.id);
}

#[tokio::test]
async fn access_token_expires_at_exp() {
    let h = harness();
    let out = h.register_and_login("ada@example.com", "s3cret-pass").await;

    h.clock.advance(Duration::minutes(15) - Duration::seconds(1));
    assert!(h.service.verify(&h.ctx, &out.tokens.access_token).await.is_ok());

    h.clock.advance(Duration::seconds(1));
    let expired = h.service.verify(&h.ctx, &out.tokens.access_token).await;
    assert!(matches!(
        expired,
        Err(IdentityError::InvalidToken(TokenError::TokenExpired))
    ));
}

#[tokio::test]
async fn token_is_not_valid_before_issuance() {
    let h = harness();
    let out = h.register_and_login("ada@example.com", "s3cret-pass").await;

    h.clock.advance(Duration::seconds(-1));
    let early = h.service.verify(&h.ctx, &out.tokens.access_token).await;
    assert!(matches!(
        early,
        Err(IdentityError::InvalidToken(TokenError::TokenNotYetValid))
    ));
}

#[tokio::test]
async fn oversized_token_lifetime_fails_login_without_panicking() {
    let repo = Arc::new(InMemoryAccountRepository::new());
    let config = IdentityConfig {
        access_token_ttl: StdDuration::from_secs(10_000_000_000_000),
        refresh_token_ttl: StdDuration::from_secs(20_000_000_000_000),
        ..config()
    };
    let service = CredentialService::new(repo, Arc::new(config));
    let ctx = RequestContext::new();

    service
        .register(&ctx, registration("ada@example.com", "s3cret-pass"))
        .await
        .unwrap();
    let out = service
        .login(&ctx, credentials("ada@example.com", "s3cret-pass"))
        .await;
    assert!(matches!(out, Err(IdentityError::Internal(_))));
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() {
    let h = harness();
    let out = h.register_and_login("ada@example.com", "s3cret-pass").await;

    let other_config = IdentityConfig {
        token_secret: TokenSecret::new(vec![12u8; 32]).unwrap(),
        ..config()
    };
    let other = CredentialService::new(Arc::clone(&h.repo), Arc::new(other_config))
        .with_clock(h.clock.clone());

    let forged = other.verify(&h.ctx, &out.tokens.access_token).await;
    assert!(matches!(
        forged,
        Err(IdentityError::InvalidToken(TokenError::InvalidSignature))
    ));
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let h = harness();
    let out = h.register_and_login("ada@example.com", "s3cret-pass").await;

    let mut tampered = out.tokens.access_token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let result = h.service.verify(&h.ctx, &tampered).await;
    assert!(matches!(result, Err(IdentityError::InvalidToken(_))));

    let garbage = h.service.verify(&h.ctx, "definitely.not.a-token").await;
    assert!(matches!(garbage, Err(IdentityError::InvalidToken(_))));
}

#[tokio::test]
async fn refresh_issues_new_pair_for_same_account() {
    let h = harness();
    let out = h.register_and_login("ada@example.com", "s3cret-pass").await;

    // Access token is dead, refresh token still good
    h.clock.advance(Duration::hours(1));
    assert!(h.service.verify(&h.ctx, &out.tokens.access_token).await.is_err());

    let pair = h.service.refresh(&h.ctx, &out.tokens.refresh_token).await.unwrap();
    let account = h.service.verify(&h.ctx, &pair.access_token).await.unwrap();
    assert_eq!(account.id, out.account_id);
    assert_ne!(pair.access_token, out.tokens.access_token);

    // Not revoked by the refresh
    assert!(h.service.verify(&h.ctx, &out.tokens.refresh_token).await.is_ok());
}

#[tokio::test]
async fn refresh_with_expired_token_fails() {
    let h = harness();
    let out = h.register_and_login("ada@example.com", "s3cret-pass").await;

    h.clock.advance(Duration::hours(24));
    let result = h.service.refresh(&h.ctx, &out.tokens.refresh_token).await;
    assert!(matches!(
        result,
        Err(IdentityError::InvalidToken(TokenError::TokenExpired))
    ));
}

#[tokio::test]
async fn token_for_deleted_account_resolves_to_not_found() {
    let h = harness();
    let out = h.register_and_login("ada@example.com", "s3cret-pass").await;

    h.service.delete_user(&h.ctx, &out.account_id).await.unwrap();

    let verify = h.service.verify(&h.ctx, &out.tokens.access_token).await;
    assert!(matches!(verify, Err(IdentityError::AccountNotFound)));

    let refresh = h.service.refresh(&h.ctx, &out.tokens.refresh_token).await;
    assert!(matches!(refresh, Err(IdentityError::AccountNotFound)));
}

// ============================================================================
// Account operations
// ============================================================================

#[tokio::test]
async fn update_user_applies_patch() {
    let h = harness();
    let out = h.register_and_login("ada@example.com", "s3cret-pass").await;
    let before = h.service.get_user(&h.ctx, &out.account_id).await.unwrap();

    h.clock.advance(Duration::minutes(5));
    let patch = AccountPatch {
        name: Some("Augusta".to_string()),
        phone: Some("+44 20 7946 0000".to_string()),
        ..Default::default()
    };
    let updated = h.service.update_user(&h.ctx, &out.account_id, patch).await.unwrap();

    assert_eq!(updated.name, "Augusta");
    assert_eq!(updated.surname, before.surname);
    assert_eq!(updated.phone.as_deref(), Some("+44 20 7946 0000"));
    assert_eq!(updated.created_at, before.created_at);
    assert!(updated.updated_at > before.updated_at);
}

#[tokio::test]
async fn update_user_rejects_taken_email() {
    let h = harness();
    let ada = h.register_and_login("ada@example.com", "s3cret-pass").await;
    h.register_and_login("bob@example.com", "s3cret-pass").await;

    let patch = AccountPatch {
        email: Some("BOB@example.com".to_string()),
        ..Default::default()
    };
    let result = h.service.update_user(&h.ctx, &ada.account_id, patch).await;
    assert!(matches!(result, Err(IdentityError::AccountAlreadyExists)));

    let unchanged = h.service.get_user(&h.ctx, &ada.account_id).await.unwrap();
    assert_eq!(unchanged.email.as_str(), "ada@example.com");
}

#[tokio::test]
async fn update_user_changes_password() {
    let h = harness();
    let out = h.register_and_login("ada@example.com", "old-password").await;

    let patch = AccountPatch {
        password: Some("new-password".to_string()),
        ..Default::default()
    };
    h.service.update_user(&h.ctx, &out.account_id, patch).await.unwrap();

    let old = h.service.login(&h.ctx, credentials("ada@example.com", "old-password")).await;
    assert!(matches!(old, Err(IdentityError::InvalidPassword)));
    assert!(
        h.service
            .login(&h.ctx, credentials("ada@example.com", "new-password"))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn missing_account_operations() {
    let h = harness();
    let ghost = AccountId::new();

    assert!(matches!(
        h.service.get_user(&h.ctx, &ghost).await,
        Err(IdentityError::AccountNotFound)
    ));
    assert!(matches!(
        h.service.update_user(&h.ctx, &ghost, AccountPatch::default()).await,
        Err(IdentityError::AccountNotFound)
    ));
    assert!(matches!(
        h.service.delete_user(&h.ctx, &ghost).await,
        Err(IdentityError::AccountNotFound)
    ));
    assert!(matches!(
        h.service.get_user_by_email(&h.ctx, "ghost@example.com").await,
        Err(IdentityError::AccountNotFound)
    ));
}

// ============================================================================
// Cancellation
// ============================================================================

/// Store whose calls never complete
struct StalledRepository;

impl AccountRepository for StalledRepository {
    async fn find(&self, _filter: &AccountFilter) -> StoreResult<Option<Account>> {
        std::future::pending().await
    }

    async fn create(&self, _account: &Account) -> StoreResult<Account> {
        std::future::pending().await
    }

    async fn update(&self, _id: &AccountId, _account: &Account) -> StoreResult<Account> {
        std::future::pending().await
    }

    async fn delete(&self, _id: &AccountId) -> StoreResult<()> {
        std::future::pending().await
    }
}

fn stalled_service() -> CredentialService<StalledRepository> {
    CredentialService::new(Arc::new(StalledRepository), Arc::new(config()))
}

#[tokio::test]
async fn cancellation_aborts_store_call() {
    let service = stalled_service();
    let ctx = RequestContext::new();
    let token = ctx.cancellation_token().clone();

    tokio::spawn(async move {
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        token.cancel();
    });

    let result = service.login(&ctx, credentials("ada@example.com", "pw")).await;
    assert!(matches!(result, Err(IdentityError::Cancelled)));
}

#[tokio::test]
async fn deadline_aborts_store_call() {
    let service = stalled_service();
    let ctx = RequestContext::new().with_timeout(StdDuration::from_millis(30));

    let result = service.register(&ctx, registration("ada@example.com", "pw")).await;
    assert!(matches!(result, Err(IdentityError::DeadlineExceeded)));
}
