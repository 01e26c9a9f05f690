//! Storefront Server Library
//!
//! HTTP API for a small shop: accounts, product catalog, carts and checkout
//! with per-day order numbers. Backed by SQLite.

pub mod core;
pub mod shop;

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::core::store::Store;
use crate::core::uploads::MAX_FILES_PER_UPLOAD;
use crate::core::{AppConfig, AppState};

/// Slack for multipart framing and form fields on top of the file bytes.
const BODY_OVERHEAD: usize = 1024 * 1024;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    let body_limit = state.config.max_upload_size * MAX_FILES_PER_UPLOAD + BODY_OVERHEAD;
    let uploads_dir = state.uploads.root().to_path_buf();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(crate::core::router(&state))
        .merge(crate::shop::router(&state))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        // Credentials rule out a literal `*`, so echo the caller's origin.
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "environment": state.config.environment,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Storefront API",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "endpoints": {
            "health": "/health",
            "auth": "/auth",
            "products": "/products",
            "cart": "/cart",
            "orders": "/orders",
            "upload": "/upload",
            "payments": "/payments",
        }
    }))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=info,tower_http=info,sqlx=warn".into()),
        )
        .init();
}

/// Run the server until Ctrl+C or SIGTERM.
pub async fn run() -> anyhow::Result<()> {
    // A missing .env is fine; deployments set the variables directly.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::from_env().context("loading configuration")?;
    info!("Starting storefront - environment: {}", config.environment);
    if config.demo_mode {
        if config.is_production() {
            warn!("DEMO_MODE is enabled in production: payments are simulated");
        } else {
            info!("Demo mode on: payments are simulated");
        }
    }

    let store = Store::connect(&config.database_url).await?;
    store.ping().await.context("database ping failed")?;
    let collections = store.collections().await?;
    info!("Database ready, collections: {}", collections.join(", "));

    let addr = config.bind_addr;
    let state = AppState::new(config, store.clone()).await?;
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Storefront listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    store.close().await;
    info!("Storefront shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
