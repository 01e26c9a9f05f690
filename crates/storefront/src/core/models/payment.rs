use serde::{Deserialize, Serialize};

use super::Violations;
use crate::core::error::Result;

#[derive(Debug, Deserialize)]
pub struct CardPayment {
    pub card_number: String,
    pub card_holder: String,
    pub expiry_date: String,
    pub cvv: String,
    pub amount: f64,
}

impl CardPayment {
    pub fn validate(&self) -> Result<()> {
        let mut violations = Violations::new();
        check_amount(&mut violations, self.amount);
        for (field, value) in [
            ("card_number", &self.card_number),
            ("card_holder", &self.card_holder),
            ("expiry_date", &self.expiry_date),
            ("cvv", &self.cvv),
        ] {
            if value.trim().is_empty() {
                violations.push(field, "must not be empty");
            }
        }
        violations.into_result()
    }
}

#[derive(Debug, Deserialize)]
pub struct PixPayment {
    pub amount: f64,
}

impl PixPayment {
    pub fn validate(&self) -> Result<()> {
        let mut violations = Violations::new();
        check_amount(&mut violations, self.amount);
        violations.into_result()
    }
}

fn check_amount(violations: &mut Violations, amount: f64) {
    if !amount.is_finite() || amount <= 0.0 {
        violations.push("amount", "must be greater than 0");
    }
}

/// Result of a simulated payment.
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub status: String,
    pub message: String,
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix_code: Option<String>,
}
