//! Payment handlers
//!
//! Only simulated payments exist. With demo mode off both routes answer 501.

use axum::{extract::State, Json};
use tracing::info;
use uuid::Uuid;

use crate::core::config::AppState;
use crate::core::error::{Error, Result};
use crate::core::extract::ApiJson;
use crate::core::models::{CardPayment, PaymentReceipt, PixPayment};

/// Static BR Code returned by simulated PIX payments.
pub const DEMO_PIX_CODE: &str = "00020126360014BR.COM.PIX0114+5511999999995204000053039865406100.005802BR5913Loja Demo6009Sao Paulo62070503***6304ABCD";

fn require_demo(state: &AppState) -> Result<()> {
    if state.config.demo_mode {
        Ok(())
    } else {
        Err(Error::NotImplemented(
            "real payment processing is not implemented".to_string(),
        ))
    }
}

/// POST /payments/card
pub async fn pay_with_card(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CardPayment>,
) -> Result<Json<PaymentReceipt>> {
    req.validate()?;
    require_demo(&state)?;

    let transaction_id = format!("demo-card-{}", Uuid::new_v4());
    info!("[Payments] Simulated card payment {} for {:.2}", transaction_id, req.amount);

    Ok(Json(PaymentReceipt {
        status: "success".to_string(),
        message: "card payment simulated (demo mode)".to_string(),
        transaction_id,
        pix_code: None,
    }))
}

/// POST /payments/pix
pub async fn pay_with_pix(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PixPayment>,
) -> Result<Json<PaymentReceipt>> {
    req.validate()?;
    require_demo(&state)?;

    let transaction_id = format!("demo-pix-{}", Uuid::new_v4());
    info!("[Payments] Simulated PIX payment {} for {:.2}", transaction_id, req.amount);

    Ok(Json(PaymentReceipt {
        status: "success".to_string(),
        message: "PIX payment simulated (demo mode)".to_string(),
        transaction_id,
        pix_code: Some(DEMO_PIX_CODE.to_string()),
    }))
}
