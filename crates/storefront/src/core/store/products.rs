use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::core::models::{Product, ProductFilter, ProductUpdate};

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, category, brand, image_urls, \
                               created_at, updated_at, created_by";

pub async fn insert<'e>(db: impl SqliteExecutor<'e>, product: &Product) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO products (id, name, description, price, stock, category, brand, image_urls, \
         created_at, updated_at, created_by) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.category)
    .bind(&product.brand)
    .bind(sqlx::types::Json(&product.image_urls))
    .bind(product.created_at)
    .bind(product.updated_at)
    .bind(&product.created_by)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find<'e>(db: impl SqliteExecutor<'e>, id: &str) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ProductFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(category) = filter.category {
        qb.push(" AND category = ").push_bind(category);
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        qb.push(" AND (instr(lower(name), ")
            .push_bind(needle.clone())
            .push(") > 0 OR instr(lower(description), ")
            .push_bind(needle)
            .push(") > 0)");
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
    if filter.in_stock {
        qb.push(" AND stock > 0");
    }
}

pub async fn count<'e>(db: impl SqliteExecutor<'e>, filter: &ProductFilter) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
    push_filter(&mut qb, filter);
    let (total,): (i64,) = qb.build_query_as().fetch_one(db).await?;
    Ok(total)
}

/// Newest first.
pub async fn list<'e>(
    db: impl SqliteExecutor<'e>,
    filter: &ProductFilter,
    offset: i64,
    limit: i64,
) -> Result<Vec<Product>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let products = qb.build_query_as().fetch_all(db).await?;
    Ok(products)
}

/// Write only the fields present in `changes`. Returns false when no row
/// matched.
pub async fn update<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
    changes: &ProductUpdate,
    at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE products SET updated_at = ");
    qb.push_bind(at);
    if let Some(name) = &changes.name {
        qb.push(", name = ").push_bind(name.clone());
    }
    if let Some(description) = &changes.description {
        qb.push(", description = ").push_bind(description.clone());
    }
    if let Some(price) = changes.price {
        qb.push(", price = ").push_bind(price);
    }
    if let Some(stock) = changes.stock {
        qb.push(", stock = ").push_bind(stock);
    }
    if let Some(category) = changes.category {
        qb.push(", category = ").push_bind(category);
    }
    if let Some(brand) = &changes.brand {
        qb.push(", brand = ").push_bind(brand.clone());
    }
    qb.push(" WHERE id = ").push_bind(id.to_string());
    let result = qb.build().execute(db).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_image_urls<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
    image_urls: &[String],
    at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE products SET image_urls = ?, updated_at = ? WHERE id = ?")
        .bind(sqlx::types::Json(image_urls))
        .bind(at)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e>(db: impl SqliteExecutor<'e>, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Take `quantity` units if at least that many are in stock. Returns false
/// when the product is missing or short.
pub async fn decrement_stock<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
    quantity: i64,
    at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - ?, updated_at = ? WHERE id = ? AND stock >= ?",
    )
    .bind(quantity)
    .bind(at)
    .bind(id)
    .bind(quantity)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn increment_stock<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
    quantity: i64,
    at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE products SET stock = stock + ?, updated_at = ? WHERE id = ?")
        .bind(quantity)
        .bind(at)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
