use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::core::models::{CartLine, CartLineView};

/// Create the cart row for `user_id` if it does not exist yet.
pub async fn ensure<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO carts (user_id, created_at, updated_at) VALUES (?, ?, ?)
         ON CONFLICT(user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(at)
    .bind(at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn touch<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE carts SET updated_at = ? WHERE user_id = ?")
        .bind(at)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn updated_at<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    let row: Option<(DateTime<Utc>,)> =
        sqlx::query_as("SELECT updated_at FROM carts WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(db)
            .await?;
    Ok(row.map(|(at,)| at))
}

/// Add `quantity` to the line for `product_id`, creating it if needed.
/// The cart row must exist.
pub async fn add_item<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
    product_id: &str,
    quantity: i64,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO cart_items (user_id, product_id, quantity, added_at) VALUES (?, ?, ?, ?)
         ON CONFLICT(user_id, product_id) DO UPDATE SET quantity = quantity + excluded.quantity",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .bind(at)
    .execute(db)
    .await?;
    Ok(())
}

/// Returns false when the cart has no line for `product_id`.
pub async fn set_quantity<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
    product_id: &str,
    quantity: i64,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE cart_items SET quantity = ? WHERE user_id = ? AND product_id = ?")
            .bind(quantity)
            .bind(user_id)
            .bind(product_id)
            .execute(db)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn remove_item<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
    product_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ? AND product_id = ?")
        .bind(user_id)
        .bind(product_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Drop every line; returns how many were removed.
pub async fn clear<'e>(db: impl SqliteExecutor<'e>, user_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

/// Stored lines in insertion order, including ones whose product is gone.
pub async fn lines<'e>(db: impl SqliteExecutor<'e>, user_id: &str) -> Result<Vec<CartLine>, sqlx::Error> {
    sqlx::query_as(
        "SELECT product_id, quantity FROM cart_items
         WHERE user_id = ? ORDER BY added_at, rowid",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Lines joined with their current product; lines for deleted products are
/// left out.
pub async fn view<'e>(db: impl SqliteExecutor<'e>, user_id: &str) -> Result<Vec<CartLineView>, sqlx::Error> {
    sqlx::query_as(
        "SELECT ci.product_id, ci.quantity, p.name, p.price, p.stock, p.image_urls
         FROM cart_items ci JOIN products p ON p.id = ci.product_id
         WHERE ci.user_id = ? ORDER BY ci.added_at, ci.rowid",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}
