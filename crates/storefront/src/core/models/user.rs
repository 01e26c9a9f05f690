use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Violations;
use crate::core::error::Result;

const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// User record stored in database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Public user info (no sensitive data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub password_confirm: String,
}

impl UserCreate {
    pub fn validate(&self) -> Result<()> {
        let mut violations = Violations::new();
        if !is_plausible_email(&self.email) {
            violations.push("email", "is not a valid email address");
        }
        violations.check_len("full_name", &self.full_name, 3, 100);
        check_password(&mut violations, "password", &self.password);
        if self.password != self.password_confirm {
            violations.push("password_confirm", "passwords do not match");
        }
        violations.into_result()
    }
}

/// OAuth2-style password form: `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: String,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<()> {
        let mut violations = Violations::new();
        violations.check_len("full_name", &self.full_name, 3, 100);
        violations.into_result()
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<()> {
        let mut violations = Violations::new();
        check_password(&mut violations, "new_password", &self.new_password);
        violations.into_result()
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Strength rules: 8+ characters with upper, lower, digit and a special.
fn check_password(violations: &mut Violations, field: &str, password: &str) {
    if password.chars().count() < 8 {
        violations.push(field, "must have at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push(field, "must contain an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push(field, "must contain a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push(field, "must contain a digit");
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        violations.push(field, "must contain a special character");
    }
}

/// `local@domain.tld` with no whitespace; deliverability is not checked.
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Emails are matched case-insensitively by storing them lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
