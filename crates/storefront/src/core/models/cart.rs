use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{round_money, Violations};
use crate::core::error::Result;

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
    #[serde(default = "one")]
    pub quantity: i64,
}

impl AddToCartRequest {
    pub fn validate(&self) -> Result<()> {
        let mut violations = Violations::new();
        if self.quantity < 1 {
            violations.push("quantity", "must be at least 1");
        }
        violations.into_result()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i64,
}

impl UpdateCartItemRequest {
    pub fn validate(&self) -> Result<()> {
        let mut violations = Violations::new();
        if self.quantity < 0 {
            violations.push("quantity", "must be 0 or more");
        }
        violations.into_result()
    }
}

/// A stored cart line; only the product reference and quantity are kept.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

/// A cart line joined with the current product row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLineView {
    pub product_id: String,
    pub quantity: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    #[sqlx(json)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub product_price: f64,
    pub product_image: Option<String>,
    pub quantity: i64,
    pub subtotal: f64,
    pub in_stock: bool,
    pub available_stock: i64,
}

impl From<CartLineView> for CartItemResponse {
    fn from(line: CartLineView) -> Self {
        Self {
            subtotal: round_money(line.price * line.quantity as f64),
            in_stock: line.stock >= line.quantity,
            product_image: line.image_urls.into_iter().next(),
            product_id: line.product_id,
            product_name: line.name,
            product_price: line.price,
            quantity: line.quantity,
            available_stock: line.stock,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartResponse {
    pub user_id: String,
    pub items: Vec<CartItemResponse>,
    pub total_items: i64,
    pub subtotal: f64,
    pub updated_at: DateTime<Utc>,
}

impl CartResponse {
    pub fn new(user_id: String, lines: Vec<CartLineView>, updated_at: DateTime<Utc>) -> Self {
        let items: Vec<CartItemResponse> = lines.into_iter().map(CartItemResponse::from).collect();
        let total_items = items.iter().map(|item| item.quantity).sum();
        let subtotal = round_money(items.iter().map(|item| item.subtotal).sum());
        Self {
            user_id,
            items,
            total_items,
            subtotal,
            updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClearCartResponse {
    pub message: String,
    pub items_removed: u64,
}
