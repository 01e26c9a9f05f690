use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{round_money, Violations};
use crate::core::error::Result;

/// Product categories; the serialized form is the display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Category {
    #[serde(rename = "Moda")]
    #[sqlx(rename = "Moda")]
    Fashion,
    #[serde(rename = "Moda Íntima")]
    #[sqlx(rename = "Moda Íntima")]
    Lingerie,
    #[serde(rename = "Infantil")]
    #[sqlx(rename = "Infantil")]
    Kids,
    #[serde(rename = "Vestidos")]
    #[sqlx(rename = "Vestidos")]
    Dresses,
    #[serde(rename = "Blusas")]
    #[sqlx(rename = "Blusas")]
    Blouses,
    #[serde(rename = "Calças")]
    #[sqlx(rename = "Calças")]
    Trousers,
    #[serde(rename = "Acessórios")]
    #[sqlx(rename = "Acessórios")]
    Accessories,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Fashion,
        Category::Lingerie,
        Category::Kids,
        Category::Dresses,
        Category::Blouses,
        Category::Trousers,
        Category::Accessories,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Fashion => "Moda",
            Category::Lingerie => "Moda Íntima",
            Category::Kids => "Infantil",
            Category::Dresses => "Vestidos",
            Category::Blouses => "Blusas",
            Category::Trousers => "Calças",
            Category::Accessories => "Acessórios",
        }
    }
}

/// A catalog product as stored and returned.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub category: Category,
    pub brand: Option<String>,
    #[sqlx(json)]
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub category: Category,
    pub brand: Option<String>,
}

impl ProductCreate {
    /// Validate and round the price to cents.
    pub fn validated(mut self) -> Result<Self> {
        let mut violations = Violations::new();
        violations.check_len("name", &self.name, 3, 200);
        violations.check_len("description", &self.description, 10, 2000);
        check_price(&mut violations, self.price);
        check_stock(&mut violations, self.stock);
        violations.check_max_len("brand", self.brand.as_deref(), 100);
        violations.into_result()?;
        self.price = round_money(self.price);
        Ok(self)
    }
}

/// Partial update; absent and null fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub category: Option<Category>,
    pub brand: Option<String>,
}

impl ProductUpdate {
    pub fn validated(mut self) -> Result<Self> {
        let mut violations = Violations::new();
        if let Some(name) = &self.name {
            violations.check_len("name", name, 3, 200);
        }
        if let Some(description) = &self.description {
            violations.check_len("description", description, 10, 2000);
        }
        if let Some(price) = self.price {
            check_price(&mut violations, price);
        }
        if let Some(stock) = self.stock {
            check_stock(&mut violations, stock);
        }
        violations.check_max_len("brand", self.brand.as_deref(), 100);
        violations.into_result()?;
        self.price = self.price.map(round_money);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.brand.is_none()
    }
}

fn check_price(violations: &mut Violations, price: f64) {
    if !price.is_finite() || price <= 0.0 {
        violations.push("price", "must be greater than 0");
    }
}

fn check_stock(violations: &mut Violations, stock: i64) {
    if stock < 0 {
        violations.push("stock", "must be 0 or more");
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub category: Option<Category>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: Option<bool>,
}

/// Catalog filters after query validation.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: bool,
}

impl ProductListQuery {
    pub fn filter(&self) -> Result<ProductFilter> {
        let mut violations = Violations::new();
        for (field, value) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if matches!(value, Some(v) if !(v >= 0.0)) {
                violations.push(field, "must be 0 or more");
            }
        }
        violations.into_result()?;

        Ok(ProductFilter {
            category: self.category,
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            min_price: self.min_price,
            max_price: self.max_price,
            in_stock: self.in_stock.unwrap_or(false),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
}
