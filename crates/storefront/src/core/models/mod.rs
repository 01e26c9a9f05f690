//! Domain models and request validation.

pub mod cart;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;

pub use cart::*;
pub use order::*;
pub use payment::*;
pub use product::*;
pub use user::*;

use crate::core::error::{Error, Result};

/// Round a currency amount to cents.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Collects field-level validation failures and turns them into a 422.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl AsRef<str>) {
        self.0.push(format!("{field}: {}", message.as_ref()));
    }

    /// Character-count bounds, inclusive.
    pub fn check_len(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min {
            self.push(field, format!("must have at least {min} characters"));
        } else if len > max {
            self.push(field, format!("must have at most {max} characters"));
        }
    }

    pub fn check_max_len(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            self.check_len(field, value, 0, max);
        }
    }

    pub fn check_range(&mut self, field: &str, value: i64, min: i64, max: i64) {
        if value < min || value > max {
            self.push(field, format!("must be between {min} and {max}"));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self.0))
        }
    }
}

/// Resolve `page`/`page_size` query values against their bounds and return
/// `(page, page_size, offset)`.
pub fn paging(
    page: Option<i64>,
    page_size: Option<i64>,
    max_page_size: i64,
) -> Result<(i64, i64, i64)> {
    let page = page.unwrap_or(1);
    let page_size = page_size.unwrap_or(10);
    let mut violations = Violations::new();
    if page < 1 {
        violations.push("page", "must be at least 1");
    }
    violations.check_range("page_size", page_size, 1, max_page_size);
    violations.into_result()?;

    let offset = (page - 1)
        .checked_mul(page_size)
        .ok_or_else(|| Error::Validation(vec!["page: is too large".to_string()]))?;
    Ok((page, page_size, offset))
}
