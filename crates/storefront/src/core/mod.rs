//! Core Service Layer
//!
//! Shared infrastructure for the storefront: configuration, errors,
//! authentication, data models, persistence and file storage.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod error;
pub mod extract;
pub mod models;
pub mod router;
pub mod store;
pub mod uploads;

// Re-exports for convenience
pub use config::{AppConfig, AppState};
pub use ctx::Ctx;
pub use error::{Error, Result};
pub use router::router;
