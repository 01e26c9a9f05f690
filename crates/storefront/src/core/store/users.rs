use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::core::models::User;

const USER_COLUMNS: &str = "id, email, full_name, hashed_password, is_active, is_verified, \
                            created_at, updated_at, last_login";

pub async fn insert<'e>(db: impl SqliteExecutor<'e>, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, email, full_name, hashed_password, is_active, is_verified, \
         created_at, updated_at, last_login) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(&user.hashed_password)
    .bind(user.is_active)
    .bind(user.is_verified)
    .bind(user.created_at)
    .bind(user.updated_at)
    .bind(user.last_login)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_by_email<'e>(
    db: impl SqliteExecutor<'e>,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn find_by_id<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn email_exists<'e>(db: impl SqliteExecutor<'e>, email: &str) -> Result<bool, sqlx::Error> {
    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(db)
        .await?;
    Ok(existing.is_some())
}

pub async fn touch_last_login<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn update_full_name<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
    full_name: &str,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET full_name = ?, updated_at = ? WHERE id = ?")
        .bind(full_name)
        .bind(at)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn update_password<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
    hashed_password: &str,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET hashed_password = ?, updated_at = ? WHERE id = ?")
        .bind(hashed_password)
        .bind(at)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Test and admin hook; there is no HTTP route that deactivates users.
pub async fn set_active<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
    active: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
        .bind(active)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
