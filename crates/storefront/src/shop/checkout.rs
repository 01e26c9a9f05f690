//! Checkout and order numbering.
//!
//! `place_order` runs as one transaction: the daily counter bump, the stock
//! checks, the order insert, the stock decrements and the cart clear either
//! all commit or all roll back. The counter upsert is the first statement,
//! so the transaction holds SQLite's write lock before it reads the cart
//! and concurrent checkouts queue on `busy_timeout` instead of interleaving.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info};

use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::models::{
    round_money, CreateOrderRequest, Order, OrderItem, OrderStatus,
};
use crate::core::store::{carts, counters, new_id, orders, parse_id, products, Store};

/// Flat shipping fee by destination state.
pub fn shipping_fee(state: &str) -> f64 {
    match state {
        "SP" => 15.0,
        "RJ" => 20.0,
        "MG" => 25.0,
        "ES" => 30.0,
        "PR" | "SC" => 35.0,
        "RS" => 40.0,
        _ => 50.0,
    }
}

/// Delivery estimate in days by destination state.
pub fn delivery_days(state: &str) -> i64 {
    match state {
        "SP" => 3,
        "RJ" => 5,
        "MG" | "ES" => 7,
        "PR" | "SC" => 10,
        "RS" => 12,
        _ => 15,
    }
}

/// Counter row holding the order sequence for one UTC day.
pub fn counter_key(day: NaiveDate) -> String {
    format!("order_{}", day.format("%Y%m%d"))
}

/// `PED-YYYYMMDD-NNNN`; sequences past 9999 keep all their digits.
pub fn format_order_number(day: NaiveDate, sequence: i64) -> String {
    format!("PED-{}-{:04}", day.format("%Y%m%d"), sequence)
}

pub fn estimated_delivery(now: DateTime<Utc>, state: &str) -> DateTime<Utc> {
    now + Duration::days(delivery_days(state))
}

/// Turn the caller's cart into an order.
pub async fn place_order(store: &Store, ctx: &Ctx, req: CreateOrderRequest) -> Result<Order> {
    let address = req.shipping_address.normalized()?;
    let now = Utc::now();
    let day = now.date_naive();

    let mut tx = store.pool().begin().await?;

    let sequence = counters::increment(&mut *tx, &counter_key(day)).await?;

    let lines = carts::lines(&mut *tx, ctx.user_id()).await?;
    if lines.is_empty() {
        return Err(Error::BadRequest("cart is empty".to_string()));
    }

    let mut items = Vec::with_capacity(lines.len());
    for line in &lines {
        let product = products::find(&mut *tx, &line.product_id)
            .await?
            .ok_or_else(|| {
                Error::BadRequest(format!("product {} not found", line.product_id))
            })?;

        if product.stock < line.quantity {
            return Err(Error::BadRequest(format!(
                "insufficient stock for {}, available: {}",
                product.name, product.stock
            )));
        }

        items.push(OrderItem {
            subtotal: round_money(product.price * line.quantity as f64),
            product_id: product.id,
            product_name: product.name,
            product_price: product.price,
            quantity: line.quantity,
        });
    }

    let subtotal = round_money(items.iter().map(|item| item.subtotal).sum());
    let shipping_fee = shipping_fee(&address.state);

    let order = Order {
        id: new_id(),
        order_number: format_order_number(day, sequence),
        user_id: ctx.user_id().to_string(),
        user_name: ctx.full_name().to_string(),
        user_email: ctx.email().to_string(),
        items,
        subtotal,
        shipping_fee,
        total: round_money(subtotal + shipping_fee),
        payment_method: req.payment_method,
        estimated_delivery: Some(estimated_delivery(now, &address.state)),
        shipping_address: address,
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: now,
        tracking_code: None,
    };

    orders::insert(&mut *tx, &order).await?;

    for item in &order.items {
        if !products::decrement_stock(&mut *tx, &item.product_id, item.quantity, now).await? {
            return Err(Error::BadRequest(format!(
                "insufficient stock for {}",
                item.product_name
            )));
        }
    }

    carts::clear(&mut *tx, ctx.user_id()).await?;
    carts::touch(&mut *tx, ctx.user_id(), now).await?;

    tx.commit().await?;

    info!(
        "[Checkout] Order {} placed by {} ({} lines, total {:.2})",
        order.order_number,
        ctx.email(),
        order.items.len(),
        order.total
    );
    Ok(order)
}

/// Load an order the caller owns: bad id 400, missing 404, foreign 403.
pub async fn owned_order(store: &Store, ctx: &Ctx, raw_id: &str) -> Result<Order> {
    let id = parse_id(raw_id, "order")?;
    let order = orders::find(store.pool(), &id)
        .await?
        .ok_or_else(|| Error::NotFound("order not found".to_string()))?;

    if order.user_id != ctx.user_id() {
        return Err(Error::Forbidden(
            "you do not have permission to access this order".to_string(),
        ));
    }
    Ok(order)
}

/// Cancel a pending or confirmed order and put its items back in stock.
pub async fn cancel_order(store: &Store, ctx: &Ctx, raw_id: &str) -> Result<Order> {
    let mut order = owned_order(store, ctx, raw_id).await?;
    if !order.status.is_cancellable() {
        return Err(Error::BadRequest(format!(
            "cannot cancel an order with status '{}'",
            order.status.label()
        )));
    }

    let now = Utc::now();
    let mut tx = store.pool().begin().await?;

    // Only the request that wins the status change restocks.
    if !orders::transition(&mut *tx, &order.id, order.status, OrderStatus::Cancelled, now).await? {
        return Err(Error::BadRequest(
            "order status changed, reload and try again".to_string(),
        ));
    }

    for item in &order.items {
        if !products::increment_stock(&mut *tx, &item.product_id, item.quantity, now).await? {
            debug!(
                "[Checkout] Product {} no longer exists, skipping restock",
                item.product_id
            );
        }
    }

    tx.commit().await?;

    order.status = OrderStatus::Cancelled;
    order.updated_at = now;
    info!("[Checkout] Order {} cancelled by {}", order.order_number, ctx.email());
    Ok(order)
}
