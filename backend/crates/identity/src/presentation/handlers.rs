//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::{HeaderMap, StatusCode};
use kernel::error::app_error::AppError;
use kernel::id::AccountId;
use platform::bearer::extract_bearer_token;

use crate::application::{CredentialService, LoginInput};
use crate::domain::repository::AccountRepository;
use crate::error::{IdentityError, IdentityResult};
use crate::presentation::dto::{
    AccountResponse, LoginRequest, LoginResponse, RegisterRequest, TokenPairResponse,
    UpdateAccountRequest,
};
use crate::presentation::middleware::AuthenticatedAccount;

/// Shared state for identity handlers
pub struct IdentityAppState<R>
where
    R: AccountRepository,
{
    pub service: CredentialService<R>,
}

impl<R> Clone for IdentityAppState<R>
where
    R: AccountRepository,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

// ============================================================================
// Register / Login / Refresh
// ============================================================================

/// POST /api/users/register
pub async fn register<R>(
    State(state): State<IdentityAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> IdentityResult<StatusCode>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let ctx = state.service.request_context();
    state.service.register(&ctx, req.into()).await?;

    Ok(StatusCode::CREATED)
}

/// POST /api/users/login
pub async fn login<R>(
    State(state): State<IdentityAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let ctx = state.service.request_context();
    let input = LoginInput {
        email: req.email,
        password: req.password,
    };

    let output = state
        .service
        .login(&ctx, input)
        .await
        .map_err(IdentityError::into_login_app_error)?;

    Ok(Json(output.into()))
}

/// POST /api/users/refresh-token (`Authorization: Bearer <refresh token>`)
pub async fn refresh_token<R>(
    State(state): State<IdentityAppState<R>>,
    headers: HeaderMap,
) -> IdentityResult<Json<TokenPairResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let token = extract_bearer_token(&headers)?;
    let ctx = state.service.request_context();
    let tokens = state.service.refresh(&ctx, token).await?;

    Ok(Json(tokens.into()))
}

// ============================================================================
// Account (requires authentication)
// ============================================================================

/// GET /api/users/me
pub async fn me(Extension(current): Extension<AuthenticatedAccount>) -> Json<AccountResponse> {
    Json(current.0.into())
}

/// GET /api/users/{id}
pub async fn get_account<R>(
    State(state): State<IdentityAppState<R>>,
    Path(id): Path<String>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let id = parse_account_id(&id)?;
    let ctx = state.service.request_context();
    let account = state.service.get_user(&ctx, &id).await?;

    Ok(Json(account.into()))
}

/// PUT /api/users/{id}
pub async fn update_account<R>(
    State(state): State<IdentityAppState<R>>,
    Path(id): Path<String>,
    Extension(current): Extension<AuthenticatedAccount>,
    Json(req): Json<UpdateAccountRequest>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let id = ensure_self(&current, &id)?;
    let ctx = state.service.request_context();
    let account = state.service.update_user(&ctx, &id, req.into()).await?;

    Ok(Json(account.into()))
}

/// DELETE /api/users/{id}
pub async fn delete_account<R>(
    State(state): State<IdentityAppState<R>>,
    Path(id): Path<String>,
    Extension(current): Extension<AuthenticatedAccount>,
) -> IdentityResult<StatusCode>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let id = ensure_self(&current, &id)?;
    let ctx = state.service.request_context();
    state.service.delete_user(&ctx, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_account_id(raw: &str) -> IdentityResult<AccountId> {
    raw.parse()
        .map_err(|_| IdentityError::InvalidInput("Invalid account id".to_string()))
}

/// Only the token holder may modify their own account
fn ensure_self(current: &AuthenticatedAccount, raw_id: &str) -> IdentityResult<AccountId> {
    let id = parse_account_id(raw_id)?;
    if id != current.0.id {
        return Err(IdentityError::Forbidden);
    }
    Ok(id)
}
