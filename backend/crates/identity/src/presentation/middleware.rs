//! Bearer Middleware
//!
//! Verifies the access token on protected routes and hands the resolved
//! account to handlers through request extensions.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use platform::bearer::extract_bearer_token;

use crate::domain::account::Account;
use crate::domain::repository::AccountRepository;
use crate::error::IdentityError;
use crate::presentation::handlers::IdentityAppState;

/// Account behind the presented bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount(pub Account);

/// Middleware that requires a valid access token
pub async fn require_bearer<R>(
    State(state): State<IdentityAppState<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, IdentityError>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let token = extract_bearer_token(req.headers())?.to_owned();

    let ctx = state.service.request_context();
    let account = state.service.verify(&ctx, &token).await?;

    tracing::debug!(account_id = %account.id, "Bearer token accepted");

    req.extensions_mut().insert(AuthenticatedAccount(account));
    Ok(next.run(req).await)
}
