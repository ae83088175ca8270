//! Shipdesk Server - HTTP API for order-fulfillment reconciliation
//!
//! This crate exposes the reconciliation pipeline over a small REST surface
//! for the fulfillment operator:
//!
//! - **Data**: run a reconciliation cycle and return the reconciled
//!   `{ payments, parcels, summary }` view
//! - **Mark shipped**: the single mutation, validated field-by-field before
//!   the status store is touched
//! - **Labels**: export pending parcels as a shipping-label CSV
//! - **Health**: liveness and readiness probes
//!
//! # Features
//!
//! - **Admin gate**: the fulfillment surface is served only when the
//!   deployment enables it in configuration, never by environment sniffing
//! - **Middleware**: compression, CORS, request ID tracking, structured
//!   logging, request timeout
//! - **Configuration**: environment variable and file-based configuration
//! - **Graceful shutdown**: SIGTERM/Ctrl+C handling
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe (checks the status store)
//!
//! ## Admin Endpoints (served when `admin_enabled`)
//!
//! - `GET /api/v1/fulfillment/data` - Reconciled payments, parcels, summary
//! - `POST /api/v1/fulfillment/status` - Mark a parcel shipped
//! - `GET /api/v1/fulfillment/labels` - Shipping-label CSV for pending parcels

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult, ValidationIssue};
pub use server::{build_router, start_server};
pub use state::ServerState;
