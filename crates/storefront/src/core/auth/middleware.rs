use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::store::users;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

pub async fn mw_require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    debug!("MIDDLEWARE: require_auth");

    let token = bearer_token(req.headers())?;

    let email = state
        .auth
        .verify_token(&token)
        .map_err(|_| Error::credentials())?;

    let user = users::find_by_email(state.store.pool(), &email)
        .await?
        .ok_or_else(Error::credentials)?;

    if !user.is_active {
        return Err(Error::Forbidden("inactive user".to_string()));
    }

    req.extensions_mut()
        .insert(Ctx::new(user.id, user.email, user.full_name));

    Ok(next.run(req).await)
}

/// Extract `<token>` from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<String> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("not authenticated".to_string()))?
        .to_str()
        .map_err(|_| Error::credentials())?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(Error::credentials)?;

    Ok(token.to_string())
}
