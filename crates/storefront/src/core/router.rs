//! Core Router
//!
//! Account routes. Everything except register and login sits behind
//! `mw_require_auth`.

use crate::core::auth::handlers as auth_handlers;
use crate::core::auth::middleware::mw_require_auth;
use crate::core::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/login", post(auth_handlers::login));

    let protected = Router::new()
        .route("/auth/me", get(auth_handlers::me).put(auth_handlers::update_me))
        .route("/auth/change-password", post(auth_handlers::change_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), mw_require_auth));

    public.merge(protected)
}
