//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (admin gate, logging, compression, etc.)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{admin_gate, log_requests, request_id};
use crate::routes::{api_info, not_found};
use crate::routes::{fulfillment, health, status};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Routes are divided into:
/// - Public routes: /, /health, /ready (always served)
/// - Admin routes: /api/v1/fulfillment/* (served only when `admin_enabled`)
pub fn build_router(state: ServerState) -> Router {
    // CORS layer
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    // Public routes
    let public_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check));

    // Admin routes, behind the deployment-configuration gate
    let admin_routes = Router::new()
        .route("/api/v1/fulfillment/data", get(fulfillment::fulfillment_data))
        .route(
            "/api/v1/fulfillment/labels",
            get(fulfillment::fulfillment_labels),
        )
        .route("/api/v1/fulfillment/status", post(status::update_status))
        .layer(from_fn_with_state(state.clone(), admin_gate));

    // Combine routes
    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .fallback(not_found)
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(request_id))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .with_state(state)
}

/// Start the shipdesk HTTP server
///
/// Initializes structured logging, builds state from configuration (status
/// store + upstream client), and serves until SIGTERM or Ctrl+C.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(config.log_level.as_str())
        .with_target(false)
        .json()
        .init();

    // Create server state
    let state = ServerState::new(config.clone())?;

    // Build router
    let app = build_router(state);

    // Parse bind address
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting shipdesk server on {} (admin_enabled={})",
        addr,
        config.admin_enabled
    );
    tracing::info!(
        "Timeout: {}s, Max body: {}MB, Status file: {}",
        config.timeout_secs,
        config.max_body_size_mb,
        config.status_file.display()
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
