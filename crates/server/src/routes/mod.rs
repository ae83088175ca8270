//! API route handlers
//!
//! This module contains all HTTP endpoint implementations for the shipdesk
//! server. Routes are organized by functionality:
//!
//! - `health`: Health checks and readiness
//! - `fulfillment`: Reconciled fulfillment data and the label CSV export
//! - `status`: The mark-shipped mutation

pub mod fulfillment;
pub mod health;
pub mod status;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Returns server information including version and available endpoints.
/// This is the root endpoint (GET /) and sits outside the admin gate.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Shipdesk Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/fulfillment/data",
            "/api/v1/fulfillment/status",
            "/api/v1/fulfillment/labels",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
