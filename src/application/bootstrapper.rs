//! Application bootstrapper
//!
//! Handles all initialization and setup for the labtrack backend.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::CONFIG;
use crate::db;
use crate::endpoints;
use crate::services::notification::NotificationService;
use crate::state::AppState;

/// Bootstrap and run the application
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting labtrack backend v{}", env!("CARGO_PKG_VERSION"));

    let state = init_services().await?;
    let app = create_app(state);

    serve(app).await
}

/// Initialize tracing/logging
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("labtrack={},tower_http={}", CONFIG.log_level, CONFIG.log_level).into()
    });

    if CONFIG.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(false))
            .init();
    }
}

/// Initialize all application services
async fn init_services() -> anyhow::Result<AppState> {
    let conn = db::connect().await?;
    tracing::info!("Database connection established");

    let notification = NotificationService::from_config(&CONFIG.mail);

    Ok(AppState::new(conn, notification))
}

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = if CONFIG.server.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = CONFIG
            .server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    endpoints::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the HTTP server
async fn serve(app: Router) -> anyhow::Result<()> {
    let host: std::net::IpAddr = CONFIG.server.host.parse()?;
    let addr = SocketAddr::from((host, CONFIG.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
