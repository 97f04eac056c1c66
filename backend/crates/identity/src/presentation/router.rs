//! Identity Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::application::CredentialService;
use crate::domain::repository::AccountRepository;
use crate::presentation::handlers::{self, IdentityAppState};
use crate::presentation::middleware::require_bearer;

/// Create the identity router for any repository implementation
///
/// Meant to be nested under `/api/users`.
pub fn identity_router<R>(service: CredentialService<R>) -> Router
where
    R: AccountRepository + Send + Sync + 'static,
{
    let state = IdentityAppState { service };

    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route(
            "/{id}",
            get(handlers::get_account::<R>)
                .put(handlers::update_account::<R>)
                .delete(handlers::delete_account::<R>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer::<R>,
        ));

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/refresh-token", post(handlers::refresh_token::<R>))
        .merge(protected)
        .with_state(state)
}
