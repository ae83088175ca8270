use crate::config::ServerConfig;
use crate::error::ServerResult;
use std::sync::Arc;
use store::{StatusStore, StoreConfig};
use upstream::{HttpPaymentsApi, PaymentsApi};

/// Shared application state
///
/// Both collaborators sit behind trait objects and are injected at
/// construction: handlers never reach for a global client, and tests build
/// the same state from fakes via [`ServerState::with_parts`].
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Shipment status store (shared across requests)
    pub store: Arc<dyn StatusStore>,

    /// Upstream payment-processor client (shared across requests)
    pub payments: Arc<dyn PaymentsApi>,
}

impl ServerState {
    /// Create server state from configuration: a JSON-file status store at
    /// the configured path plus the HTTP upstream client.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = StoreConfig::json_file(&config.status_file).build()?;
        let payments = HttpPaymentsApi::new(config.upstream.clone())?;

        Ok(Self {
            config: Arc::new(config),
            store: Arc::from(store),
            payments: Arc::new(payments),
        })
    }

    /// Assemble state from explicit collaborators.
    pub fn with_parts(
        config: ServerConfig,
        store: Arc<dyn StatusStore>,
        payments: Arc<dyn PaymentsApi>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            payments,
        }
    }
}
