//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use jsonwebtoken::Algorithm;
use thiserror::Error;

use crate::core::auth::AuthManager;
use crate::core::store::Store;
use crate::core::uploads::UploadStore;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Configuration for the storefront server, read from the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// SQLite connection URL
    pub database_url: String,
    /// JWT signing secret
    pub secret_key: String,
    /// JWT algorithm (HMAC family only)
    pub algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Deployment name reported by `/health`
    pub environment: String,
    /// Simulated payments on/off
    pub demo_mode: bool,
    pub allowed_origins: Vec<String>,
    /// Directory served under `/uploads`
    pub upload_dir: PathBuf,
    /// Per-file upload limit in bytes
    pub max_upload_size: usize,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret_key = get("SECRET_KEY").ok_or(ConfigError::Missing("SECRET_KEY"))?;

        let algorithm = match get("ALGORITHM") {
            Some(value) => parse_algorithm(&value)?,
            None => Algorithm::HS256,
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://data/storefront.sqlite".to_string()),
            secret_key,
            algorithm,
            access_token_expire_minutes: parse_or("ACCESS_TOKEN_EXPIRE_MINUTES", get("ACCESS_TOKEN_EXPIRE_MINUTES"), 30)?,
            bcrypt_cost: parse_or("BCRYPT_COST", get("BCRYPT_COST"), bcrypt::DEFAULT_COST)?,
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            demo_mode: parse_bool("DEMO_MODE", get("DEMO_MODE"))?,
            allowed_origins,
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            max_upload_size: parse_or("MAX_UPLOAD_SIZE", get("MAX_UPLOAD_SIZE"), 5 * 1024 * 1024)?,
            bind_addr: parse_or(
                "BIND_ADDR",
                get("BIND_ADDR"),
                SocketAddr::from(([0, 0, 0, 0], 8000)),
            )?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(_) => Err(ConfigError::Invalid {
            name,
            value: value.unwrap_or_default(),
        }),
    }
}

fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    match value.trim() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::Invalid {
            name: "ALGORITHM",
            value: value.to_string(),
        }),
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
    pub auth: Arc<AuthManager>,
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    pub async fn new(config: AppConfig, store: Store) -> anyhow::Result<Self> {
        let auth = AuthManager::new(
            &config.secret_key,
            config.algorithm,
            config.access_token_expire_minutes,
            config.bcrypt_cost,
        );
        let uploads = UploadStore::new(config.upload_dir.clone(), config.max_upload_size);
        uploads.ensure_dirs().await?;

        Ok(Self {
            config: Arc::new(config),
            store,
            auth: Arc::new(auth),
            uploads: Arc::new(uploads),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = AppConfig::from_lookup(lookup(&[("SECRET_KEY", "s3cret")])).unwrap();
        assert_eq!(config.algorithm, Algorithm::HS256);
        assert_eq!(config.access_token_expire_minutes, 30);
        assert_eq!(config.environment, "development");
        assert!(!config.demo_mode);
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.max_upload_size, 5_242_880);
        assert_eq!(config.bind_addr.port(), 8000);
    }

    #[test]
    fn missing_secret_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SECRET_KEY")));
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SECRET_KEY", "s3cret"),
            ("ALLOWED_ORIGINS", "https://shop.example, http://localhost:5173 ,"),
        ]))
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://shop.example", "http://localhost:5173"]
        );
    }

    #[test]
    fn bad_numbers_and_algorithms_fail() {
        let err = AppConfig::from_lookup(lookup(&[
            ("SECRET_KEY", "s3cret"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "ACCESS_TOKEN_EXPIRE_MINUTES", .. }));

        let err = AppConfig::from_lookup(lookup(&[("SECRET_KEY", "s3cret"), ("ALGORITHM", "RS256")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "ALGORITHM", .. }));
    }

    #[test]
    fn demo_mode_accepts_common_spellings() {
        let config =
            AppConfig::from_lookup(lookup(&[("SECRET_KEY", "s3cret"), ("DEMO_MODE", "True")])).unwrap();
        assert!(config.demo_mode);
    }
}
