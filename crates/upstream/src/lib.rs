//! Upstream payment-processor boundary.
//!
//! Everything the pipeline knows about the outside world comes through the
//! [`PaymentsApi`] trait: a paginated listing of payment transactions and a
//! best-effort checkout-session lookup keyed by payment id. The production
//! implementation is [`HttpPaymentsApi`]; tests swap in fakes.
//!
//! The client is an explicitly constructed, passed-in dependency. There is
//! deliberately no lazily-initialized process-wide handle: construction
//! validates configuration up front and every consumer receives the client
//! it was given.
//!
//! Both operations treat the upstream as unreliable: absent fields
//! deserialize into the loose wire model in the `normalize` crate, and only
//! a failed listing call is fatal to a reconciliation cycle (the caller
//! decides; this crate just reports errors faithfully).

use async_trait::async_trait;
use normalize::{CheckoutSession, RawPayment};
use thiserror::Error;

mod client;
mod config;

pub use crate::client::HttpPaymentsApi;
pub use crate::config::UpstreamConfig;

/// Errors from talking to the upstream processor.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum UpstreamError {
    /// The client could not be constructed from its configuration.
    #[error("upstream client misconfigured: {0}")]
    Config(String),

    /// Transport-level failure: connect, timeout, or body decode.
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream responded with status {status}")]
    Api { status: u16 },
}

/// Read operations against the upstream payment processor.
#[async_trait]
pub trait PaymentsApi: Send + Sync {
    /// List payment transactions, following pagination up to the configured
    /// record cap. Records come back in upstream order with whatever fields
    /// the processor chose to populate.
    async fn list_payments(&self) -> Result<Vec<RawPayment>, UpstreamError>;

    /// Look up the checkout session attached to a payment, if any. Scoped
    /// and best-effort: callers are expected to treat failures as "no
    /// additional data found".
    async fn checkout_session(
        &self,
        payment_id: &str,
    ) -> Result<Option<CheckoutSession>, UpstreamError>;
}
