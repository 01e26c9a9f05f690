//! Authentication Module
//!
//! Password hashing (bcrypt) and access-token issuance (JWT). Users live in
//! the `users` table; see `core::store::users`.

pub mod handlers;
pub mod middleware;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// bcrypt only looks at the first 72 bytes of its input.
pub const BCRYPT_MAX_PASSWORD_BYTES: usize = 72;

/// JWT claims carried by an access token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User email
    pub sub: String,
    pub exp: i64,
}

/// Auth manager handles hashing and tokens
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthManager {
    pub fn new(secret: &str, algorithm: Algorithm, ttl_minutes: i64, bcrypt_cost: u32) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            token_ttl: Duration::minutes(ttl_minutes),
            bcrypt_cost,
        }
    }

    /// Hash a password on the blocking pool.
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = truncate_password(password).to_string();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .context("password hashing task failed")?
            .context("Failed to hash password")
    }

    /// Check a password against a stored hash. Malformed hashes count as a
    /// mismatch.
    pub async fn verify_password(&self, password: &str, hashed: &str) -> bool {
        let password = truncate_password(password).to_string();
        let hashed = hashed.to_string();
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed)).await;
        match outcome {
            Ok(Ok(valid)) => valid,
            Ok(Err(e)) => {
                warn!("[Auth] Password verification error: {}", e);
                false
            }
            Err(e) => {
                warn!("[Auth] Password verification task failed: {}", e);
                false
            }
        }
    }

    /// Issue an access token for `email`.
    pub fn issue_token(&self, email: &str) -> Result<String> {
        let claims = Claims {
            sub: email.to_string(),
            exp: (Utc::now() + self.token_ttl).timestamp(),
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .context("Failed to encode access token")
    }

    /// Validate signature and expiry; returns the subject email.
    pub fn verify_token(&self, token: &str) -> Result<String> {
        let validation = Validation::new(self.algorithm);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Invalid access token")?;
        Ok(data.claims.sub)
    }
}

/// Cut a password down to bcrypt's input limit without splitting a UTF-8
/// sequence.
pub fn truncate_password(password: &str) -> &str {
    if password.len() <= BCRYPT_MAX_PASSWORD_BYTES {
        return password;
    }
    let mut end = BCRYPT_MAX_PASSWORD_BYTES;
    while !password.is_char_boundary(end) {
        end -= 1;
    }
    warn!(
        "[Auth] Password truncated from {} to {} bytes",
        password.len(),
        end
    );
    &password[..end]
}
