use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::extract::ApiJson;
use crate::core::models::{UpdateProfileRequest, UserResponse};
use crate::core::store::users;
use axum::extract::State;
use axum::Json;
use chrono::Utc;

/// GET /auth/me
pub async fn me(State(state): State<AppState>, ctx: Ctx) -> Result<Json<UserResponse>> {
    let user = users::find_by_id(state.store.pool(), ctx.user_id())
        .await?
        .ok_or_else(Error::credentials)?;

    Ok(Json(user.into()))
}

/// PUT /auth/me
pub async fn update_me(
    State(state): State<AppState>,
    ctx: Ctx,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    req.validate()?;

    users::update_full_name(state.store.pool(), ctx.user_id(), req.full_name.trim(), Utc::now())
        .await?;

    let user = users::find_by_id(state.store.pool(), ctx.user_id())
        .await?
        .ok_or_else(Error::credentials)?;

    Ok(Json(user.into()))
}
