use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Violations;
use crate::core::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum OrderStatus {
    #[serde(rename = "Pendente")]
    #[sqlx(rename = "Pendente")]
    Pending,
    #[serde(rename = "Confirmado")]
    #[sqlx(rename = "Confirmado")]
    Confirmed,
    #[serde(rename = "Em Processamento")]
    #[sqlx(rename = "Em Processamento")]
    Processing,
    #[serde(rename = "Enviado")]
    #[sqlx(rename = "Enviado")]
    Shipped,
    #[serde(rename = "Entregue")]
    #[sqlx(rename = "Entregue")]
    Delivered,
    #[serde(rename = "Cancelado")]
    #[sqlx(rename = "Cancelado")]
    Cancelled,
}

impl OrderStatus {
    /// Only orders that have not entered fulfilment can be cancelled.
    pub fn is_cancellable(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendente",
            OrderStatus::Confirmed => "Confirmado",
            OrderStatus::Processing => "Em Processamento",
            OrderStatus::Shipped => "Enviado",
            OrderStatus::Delivered => "Entregue",
            OrderStatus::Cancelled => "Cancelado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum PaymentMethod {
    #[serde(rename = "Cartão de Crédito")]
    #[sqlx(rename = "Cartão de Crédito")]
    CreditCard,
    #[serde(rename = "Cartão de Débito")]
    #[sqlx(rename = "Cartão de Débito")]
    DebitCard,
    #[serde(rename = "PIX")]
    #[sqlx(rename = "PIX")]
    Pix,
    #[serde(rename = "Boleto Bancário")]
    #[sqlx(rename = "Boleto Bancário")]
    Boleto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl ShippingAddress {
    /// Validate, upper-case the state and write the CEP as `NNNNN-NNN`.
    pub fn normalized(mut self) -> Result<Self> {
        let mut violations = Violations::new();
        violations.check_len("shipping_address.street", &self.street, 3, 200);
        violations.check_len("shipping_address.number", &self.number, 0, 10);
        violations.check_max_len("shipping_address.complement", self.complement.as_deref(), 100);
        violations.check_len("shipping_address.neighborhood", &self.neighborhood, 3, 100);
        violations.check_len("shipping_address.city", &self.city, 2, 100);
        violations.check_len("shipping_address.state", &self.state, 2, 2);
        let zip_code = normalize_zip_code(&self.zip_code);
        if zip_code.is_none() {
            violations.push("shipping_address.zip_code", "must match 00000-000");
        }
        violations.into_result()?;

        self.state = self.state.to_uppercase();
        self.zip_code = zip_code.unwrap_or_default();
        Ok(self)
    }
}

/// Accepts `NNNNNNNN` or `NNNNN-NNN`.
fn normalize_zip_code(raw: &str) -> Option<String> {
    let digits: String = match raw.len() {
        8 => raw.to_string(),
        9 if raw.as_bytes()[5] == b'-' => raw.replacen('-', "", 1),
        _ => return None,
    };
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}-{}", &digits[..5], &digits[5..]))
}

/// Snapshot of a cart line at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub product_price: f64,
    pub quantity: i64,
    pub subtotal: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    #[sqlx(json)]
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub shipping_fee: f64,
    pub total: f64,
    pub payment_method: PaymentMethod,
    #[sqlx(json)]
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub tracking_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub payment_method: PaymentMethod,
    pub shipping_address: ShippingAddress,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    pub tracking_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderStatsResponse {
    pub total_orders: i64,
    pub total_spent: f64,
    pub pending_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
}
