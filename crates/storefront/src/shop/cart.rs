//! Cart handlers
//!
//! Every mutation answers with the refreshed cart.

use axum::{extract::State, Json};
use chrono::Utc;
use tracing::info;

use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::extract::{ApiJson, ApiPath};
use crate::core::models::{
    AddToCartRequest, CartResponse, ClearCartResponse, Product, UpdateCartItemRequest,
};
use crate::core::store::{carts, parse_id, products, Store};

async fn load_cart(store: &Store, user_id: &str) -> Result<CartResponse> {
    let lines = carts::view(store.pool(), user_id).await?;
    let updated_at = carts::updated_at(store.pool(), user_id)
        .await?
        .unwrap_or_else(Utc::now);
    Ok(CartResponse::new(user_id.to_string(), lines, updated_at))
}

/// Look up a product and require `quantity` units in stock.
async fn stocked_product(store: &Store, raw_id: &str, quantity: i64) -> Result<Product> {
    let id = parse_id(raw_id, "product")?;
    let product = products::find(store.pool(), &id)
        .await?
        .ok_or_else(|| Error::NotFound("product not found".to_string()))?;

    if product.stock < quantity {
        return Err(Error::BadRequest(format!(
            "insufficient stock, available: {}",
            product.stock
        )));
    }
    Ok(product)
}

/// POST /cart/add
pub async fn add_to_cart(
    State(state): State<AppState>,
    ctx: Ctx,
    ApiJson(req): ApiJson<AddToCartRequest>,
) -> Result<Json<CartResponse>> {
    req.validate()?;
    let product = stocked_product(&state.store, &req.product_id, req.quantity).await?;

    let now = Utc::now();
    let mut tx = state.store.pool().begin().await?;
    carts::ensure(&mut *tx, ctx.user_id(), now).await?;
    carts::add_item(&mut *tx, ctx.user_id(), &product.id, req.quantity, now).await?;
    carts::touch(&mut *tx, ctx.user_id(), now).await?;
    tx.commit().await?;

    info!("{} added {} x {} to cart", ctx.email(), req.quantity, product.id);
    Ok(Json(load_cart(&state.store, ctx.user_id()).await?))
}

/// GET /cart
pub async fn get_cart(State(state): State<AppState>, ctx: Ctx) -> Result<Json<CartResponse>> {
    Ok(Json(load_cart(&state.store, ctx.user_id()).await?))
}

/// PUT /cart/items/{product_id}
///
/// A quantity of 0 removes the line.
pub async fn update_cart_item(
    State(state): State<AppState>,
    ctx: Ctx,
    ApiPath(product_id): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateCartItemRequest>,
) -> Result<Json<CartResponse>> {
    req.validate()?;
    let now = Utc::now();

    if req.quantity == 0 {
        carts::remove_item(state.store.pool(), ctx.user_id(), &product_id).await?;
    } else {
        let product = stocked_product(&state.store, &product_id, req.quantity).await?;
        if !carts::set_quantity(state.store.pool(), ctx.user_id(), &product.id, req.quantity).await?
        {
            return Err(Error::NotFound("item not found in cart".to_string()));
        }
    }
    carts::touch(state.store.pool(), ctx.user_id(), now).await?;

    Ok(Json(load_cart(&state.store, ctx.user_id()).await?))
}

/// DELETE /cart/items/{product_id}
pub async fn remove_cart_item(
    State(state): State<AppState>,
    ctx: Ctx,
    ApiPath(product_id): ApiPath<String>,
) -> Result<Json<CartResponse>> {
    carts::remove_item(state.store.pool(), ctx.user_id(), &product_id).await?;
    carts::touch(state.store.pool(), ctx.user_id(), Utc::now()).await?;
    Ok(Json(load_cart(&state.store, ctx.user_id()).await?))
}

/// DELETE /cart/clear
pub async fn clear_cart(
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Json<ClearCartResponse>> {
    let removed = carts::clear(state.store.pool(), ctx.user_id()).await?;
    if removed == 0 {
        return Ok(Json(ClearCartResponse {
            message: "cart already empty".to_string(),
            items_removed: 0,
        }));
    }

    carts::touch(state.store.pool(), ctx.user_id(), Utc::now()).await?;
    Ok(Json(ClearCartResponse {
        message: "cart cleared".to_string(),
        items_removed: removed,
    }))
}
