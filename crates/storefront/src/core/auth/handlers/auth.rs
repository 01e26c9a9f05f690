//! Auth handlers

use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{is_unique_violation, Error, Result};
use crate::core::extract::{ApiForm, ApiJson};
use crate::core::models::{
    normalize_email, ChangePasswordRequest, LoginForm, MessageResponse, TokenResponse, User,
    UserCreate, UserResponse,
};
use crate::core::store::{new_id, users};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use tracing::{info, warn};

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    req.validate()?;
    let email = normalize_email(&req.email);
    info!("POST /auth/register - {}", email);

    if users::email_exists(state.store.pool(), &email).await? {
        return Err(Error::BadRequest("email already registered".to_string()));
    }

    let now = Utc::now();
    let user = User {
        id: new_id(),
        email,
        full_name: req.full_name.trim().to_string(),
        hashed_password: state.auth.hash_password(&req.password).await?,
        is_active: true,
        is_verified: false,
        created_at: now,
        updated_at: now,
        last_login: None,
    };

    if let Err(e) = users::insert(state.store.pool(), &user).await {
        if is_unique_violation(&e) {
            return Err(Error::BadRequest("email already registered".to_string()));
        }
        return Err(e.into());
    }

    info!("User {} registered", user.email);
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /auth/login
///
/// Form-encoded `username` (the email) and `password`.
pub async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<Json<TokenResponse>> {
    let email = normalize_email(&form.username);
    info!("POST /auth/login - {}", email);

    let bad_credentials = || Error::Unauthorized("incorrect email or password".to_string());

    let Some(mut user) = users::find_by_email(state.store.pool(), &email).await? else {
        warn!("Login failed for {}: unknown email", email);
        return Err(bad_credentials());
    };

    if !state.auth.verify_password(&form.password, &user.hashed_password).await {
        warn!("Login failed for {}: wrong password", email);
        return Err(bad_credentials());
    }

    if !user.is_active {
        return Err(Error::Forbidden("inactive user".to_string()));
    }

    let now = Utc::now();
    users::touch_last_login(state.store.pool(), &user.id, now).await?;
    user.last_login = Some(now);

    let access_token = state.auth.issue_token(&user.email)?;
    info!("User {} logged in", user.email);

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: user.into(),
    }))
}

/// POST /auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    ctx: Ctx,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    req.validate()?;

    let user = users::find_by_id(state.store.pool(), ctx.user_id())
        .await?
        .ok_or_else(Error::credentials)?;

    if !state
        .auth
        .verify_password(&req.current_password, &user.hashed_password)
        .await
    {
        return Err(Error::BadRequest("current password is incorrect".to_string()));
    }

    let hashed = state.auth.hash_password(&req.new_password).await?;
    users::update_password(state.store.pool(), &user.id, &hashed, Utc::now()).await?;
    info!("User {} changed password", user.email);

    Ok(Json(MessageResponse {
        message: "password changed".to_string(),
    }))
}
