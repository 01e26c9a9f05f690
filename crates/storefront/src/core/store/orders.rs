use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::core::models::{Order, OrderStatsResponse, OrderStatus};

const ORDER_COLUMNS: &str = "id, order_number, user_id, user_name, user_email, items, subtotal, \
                             shipping_fee, total, payment_method, shipping_address, status, \
                             created_at, updated_at, estimated_delivery, tracking_code";

pub async fn insert<'e>(db: impl SqliteExecutor<'e>, order: &Order) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO orders (id, order_number, user_id, user_name, user_email, items, subtotal, \
         shipping_fee, total, payment_method, shipping_address, status, created_at, updated_at, \
         estimated_delivery, tracking_code) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&order.id)
    .bind(&order.order_number)
    .bind(&order.user_id)
    .bind(&order.user_name)
    .bind(&order.user_email)
    .bind(sqlx::types::Json(&order.items))
    .bind(order.subtotal)
    .bind(order.shipping_fee)
    .bind(order.total)
    .bind(order.payment_method)
    .bind(sqlx::types::Json(&order.shipping_address))
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .bind(order.estimated_delivery)
    .bind(&order.tracking_code)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find<'e>(db: impl SqliteExecutor<'e>, id: &str) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

fn push_owner_filter<'a>(
    qb: &mut QueryBuilder<'a, Sqlite>,
    user_id: &str,
    status: Option<OrderStatus>,
) {
    qb.push(" WHERE user_id = ").push_bind(user_id.to_string());
    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status);
    }
}

pub async fn count_for_user<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
    status: Option<OrderStatus>,
) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM orders");
    push_owner_filter(&mut qb, user_id, status);
    let (total,): (i64,) = qb.build_query_as().fetch_one(db).await?;
    Ok(total)
}

/// Newest first.
pub async fn list_for_user<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
    status: Option<OrderStatus>,
    offset: i64,
    limit: i64,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
    push_owner_filter(&mut qb, user_id, status);
    qb.push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let orders = qb.build_query_as().fetch_all(db).await?;
    Ok(orders)
}

/// Set the status, and the tracking code when one is given. Returns false
/// when no order matched.
pub async fn update_status<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
    status: OrderStatus,
    tracking_code: Option<&str>,
    at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE orders SET status = ?, tracking_code = COALESCE(?, tracking_code), updated_at = ?
         WHERE id = ?",
    )
    .bind(status)
    .bind(tracking_code)
    .bind(at)
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Move an order to `to` only if it is still in `from`. Guards concurrent
/// cancellations against restocking twice.
pub async fn transition<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
    from: OrderStatus,
    to: OrderStatus,
    at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
            .bind(to)
            .bind(at)
            .bind(id)
            .bind(from)
            .execute(db)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn stats_for_user<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
) -> Result<OrderStatsResponse, sqlx::Error> {
    sqlx::query_as(
        "SELECT
            COUNT(*) AS total_orders,
            CAST(COALESCE(SUM(total), 0) AS REAL) AS total_spent,
            COALESCE(SUM(status = ?), 0) AS pending_orders,
            COALESCE(SUM(status = ?), 0) AS completed_orders,
            COALESCE(SUM(status = ?), 0) AS cancelled_orders
         FROM orders WHERE user_id = ?",
    )
    .bind(OrderStatus::Pending)
    .bind(OrderStatus::Delivered)
    .bind(OrderStatus::Cancelled)
    .bind(user_id)
    .fetch_one(db)
    .await
}
