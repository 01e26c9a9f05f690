//! Catalog handlers

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::extract::{ApiJson, ApiPath, ApiQuery};
use crate::core::models::{
    paging, Category, CategoryOption, Product, ProductCreate, ProductListQuery,
    ProductListResponse, ProductUpdate,
};
use crate::core::store::{new_id, parse_id, products};
use crate::core::uploads::read_files;

const MAX_PAGE_SIZE: i64 = 100;

fn not_found() -> Error {
    Error::NotFound("product not found".to_string())
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    ctx: Ctx,
    ApiJson(req): ApiJson<ProductCreate>,
) -> Result<(StatusCode, Json<Product>)> {
    let req = req.validated()?;
    let now = Utc::now();
    let product = Product {
        id: new_id(),
        name: req.name,
        description: req.description,
        price: req.price,
        stock: req.stock,
        category: req.category,
        brand: req.brand,
        image_urls: Vec::new(),
        created_at: now,
        updated_at: now,
        created_by: ctx.user_id().to_string(),
    };

    products::insert(state.store.pool(), &product).await?;
    info!("Product {} created by {}", product.id, ctx.email());

    Ok((StatusCode::CREATED, Json(product)))
}

/// POST /products/{id}/images
pub async fn upload_product_images(
    State(state): State<AppState>,
    _ctx: Ctx,
    ApiPath(id): ApiPath<String>,
    mut multipart: Multipart,
) -> Result<Json<Product>> {
    let id = parse_id(&id, "product")?;
    let mut product = products::find(state.store.pool(), &id)
        .await?
        .ok_or_else(not_found)?;

    let files = read_files(&mut multipart, "files").await?;
    if files.is_empty() {
        return Err(Error::BadRequest("no files uploaded".to_string()));
    }

    let urls = state.uploads.save_all(&files).await?;
    product.image_urls.extend(urls);
    product.updated_at = Utc::now();

    if !products::set_image_urls(state.store.pool(), &id, &product.image_urls, product.updated_at)
        .await?
    {
        return Err(not_found());
    }

    Ok(Json(product))
}

/// GET /products
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> Result<Json<ProductListResponse>> {
    let (page, page_size, offset) = paging(query.page, query.page_size, MAX_PAGE_SIZE)?;
    let filter = query.filter()?;

    let total = products::count(state.store.pool(), &filter).await?;
    let products = products::list(state.store.pool(), &filter, offset, page_size).await?;

    Ok(Json(ProductListResponse {
        total,
        page,
        page_size,
        products,
    }))
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Product>> {
    let id = parse_id(&id, "product")?;
    let product = products::find(state.store.pool(), &id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(product))
}

/// PUT /products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    _ctx: Ctx,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<ProductUpdate>,
) -> Result<Json<Product>> {
    let id = parse_id(&id, "product")?;
    if req.is_empty() {
        return Err(Error::BadRequest("no fields to update".to_string()));
    }
    let changes = req.validated()?;

    if !products::update(state.store.pool(), &id, &changes, Utc::now()).await? {
        return Err(not_found());
    }

    let product = products::find(state.store.pool(), &id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(product))
}

/// DELETE /products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    ctx: Ctx,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "product")?;
    let product = products::find(state.store.pool(), &id)
        .await?
        .ok_or_else(not_found)?;

    if !products::delete(state.store.pool(), &id).await? {
        return Err(not_found());
    }

    for url in &product.image_urls {
        state.uploads.delete(url).await;
    }
    info!("Product {} deleted by {}", id, ctx.email());

    Ok(StatusCode::NO_CONTENT)
}

/// GET /products/categories/list
pub async fn list_categories() -> Json<Value> {
    let categories: Vec<CategoryOption> = Category::ALL
        .iter()
        .map(|category| CategoryOption {
            value: category.label(),
            label: category.label(),
        })
        .collect();
    Json(json!({ "categories": categories }))
}
