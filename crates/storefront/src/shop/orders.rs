//! Order handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::extract::{ApiJson, ApiPath, ApiQuery};
use crate::core::models::{
    paging, round_money, CreateOrderRequest, ListOrdersQuery, Order, OrderListResponse,
    OrderStatsResponse, UpdateOrderStatusRequest,
};
use crate::core::store::{orders, parse_id};
use crate::shop::checkout;

const MAX_PAGE_SIZE: i64 = 50;

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    ctx: Ctx,
    ApiJson(req): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = checkout::place_order(&state.store, &ctx, req)
        .await
        .inspect_err(|e| warn!("Checkout failed for {}: {}", ctx.email(), e))?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/my-orders
pub async fn list_my_orders(
    State(state): State<AppState>,
    ctx: Ctx,
    ApiQuery(query): ApiQuery<ListOrdersQuery>,
) -> Result<Json<OrderListResponse>> {
    let (page, page_size, offset) = paging(query.page, query.page_size, MAX_PAGE_SIZE)?;

    let total = orders::count_for_user(state.store.pool(), ctx.user_id(), query.status).await?;
    let orders = orders::list_for_user(
        state.store.pool(),
        ctx.user_id(),
        query.status,
        offset,
        page_size,
    )
    .await?;

    Ok(Json(OrderListResponse {
        total,
        page,
        page_size,
        orders,
    }))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    ctx: Ctx,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Order>> {
    Ok(Json(checkout::owned_order(&state.store, &ctx, &id).await?))
}

/// POST /orders/{id}/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    ctx: Ctx,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Order>> {
    Ok(Json(checkout::cancel_order(&state.store, &ctx, &id).await?))
}

/// GET /orders/stats/summary
pub async fn order_stats(
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Json<OrderStatsResponse>> {
    let mut stats = orders::stats_for_user(state.store.pool(), ctx.user_id()).await?;
    stats.total_spent = round_money(stats.total_spent);
    Ok(Json(stats))
}

/// PUT /orders/{id}/status
///
/// Any signed-in user may call this; there is no admin role yet.
pub async fn update_order_status(
    State(state): State<AppState>,
    ctx: Ctx,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateOrderStatusRequest>,
) -> Result<Json<Order>> {
    let id = parse_id(&id, "order")?;
    let tracking_code = req.tracking_code.as_deref().filter(|code| !code.is_empty());

    if !orders::update_status(state.store.pool(), &id, req.status, tracking_code, Utc::now()).await?
    {
        return Err(Error::NotFound("order not found".to_string()));
    }
    info!("Order {} set to {} by {}", id, req.status.label(), ctx.email());

    let order = orders::find(state.store.pool(), &id)
        .await?
        .ok_or_else(|| Error::NotFound("order not found".to_string()))?;
    Ok(Json(order))
}
