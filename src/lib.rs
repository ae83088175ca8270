//! Workspace umbrella crate for shipdesk, the order-fulfillment
//! reconciliation tool.
//!
//! The pipeline stages live in their own crates; this crate stitches them
//! into the one operation everything else is built on: the reconciliation
//! cycle. One cycle pulls payments from the upstream processor, normalizes
//! them, groups them into parcels, and merges persisted shipment status back
//! on. The cycle is idempotent: re-running it against unchanged inputs produces the
//! same snapshot.
//!
//! ```text
//! upstream API → normalize → group → reconcile (reads status store)
//!                                        ↓
//!                     { payments, parcels, summary } snapshot
//! ```
//!
//! Consumers (the HTTP server, tests) act on the snapshot: displaying it,
//! exporting pending parcels as label rows, or marking a parcel shipped,
//! which writes the status store and is picked up by the next cycle.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

pub use export::{label_rows, render_csv, ExportError, LabelRow};
pub use normalize::{
    apply_session, normalize, CheckoutSession, Payment, PostalAddress, RawPayment, SUCCEEDED,
};
pub use parcel::{address_key, group, Parcel};
pub use reconcile::{annotate_payments, reconcile_parcels, ReconciledParcel, ReconciledPayment};
pub use store::{
    InMemoryStore, JsonFileStore, ShipmentStatus, StatusDocument, StatusRecord, StatusStore,
    StoreConfig, StoreError,
};
pub use upstream::{HttpPaymentsApi, PaymentsApi, UpstreamConfig, UpstreamError};

/// Errors that abort a reconciliation cycle.
///
/// Only two things can: the upstream listing call failing, and the status
/// store failing. Per-payment lookup failures and excluded records are
/// absorbed inside the cycle.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CycleError {
    #[error("failed to list upstream payments: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("status store failure: {0}")]
    Store(#[from] StoreError),
}

/// Roll-up numbers for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_payments: usize,
    pub total_parcels: usize,
    /// Sum of every payment amount, in minor units.
    pub total_amount: i64,
}

/// The full reconciled view produced by one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentSnapshot {
    pub payments: Vec<ReconciledPayment>,
    pub parcels: Vec<ReconciledParcel>,
    pub summary: Summary,
}

/// Run one reconciliation cycle.
///
/// Lists payments (the only fatal upstream call), keeps the succeeded ones
/// that normalize to a canonical form, consults the checkout session for any
/// payment whose metadata yielded no sizes (best-effort, sequential), groups
/// into parcels, and merges status from the store. The store read fails
/// open, so a fresh deployment reconciles against empty history.
pub async fn run_cycle(
    api: &dyn PaymentsApi,
    store: &dyn StatusStore,
) -> Result<FulfillmentSnapshot, CycleError> {
    let start = Instant::now();

    let raw_payments = api.list_payments().await?;
    let listed = raw_payments.len();

    let mut payments: Vec<Payment> = Vec::new();
    for raw in &raw_payments {
        if raw.status != SUCCEEDED {
            continue;
        }
        let Some(mut payment) = normalize::normalize(raw) else {
            continue;
        };

        if payment.sizes.is_empty() {
            match api.checkout_session(&payment.id).await {
                Ok(Some(session)) => normalize::apply_session(&mut payment, &session),
                Ok(None) => {}
                Err(err) => {
                    // Best-effort lookup: a failure means "no additional
                    // data", never a failed cycle.
                    warn!(
                        payment_id = %payment.id,
                        error = %err,
                        "checkout_session_lookup_failed"
                    );
                }
            }
        }

        payments.push(payment);
    }

    let parcels = parcel::group(&payments);
    let document = store.read_all()?;

    let summary = Summary {
        total_payments: payments.len(),
        total_parcels: parcels.len(),
        total_amount: payments.iter().map(|p| p.amount_minor_units).sum(),
    };

    let snapshot = FulfillmentSnapshot {
        parcels: reconcile::reconcile_parcels(parcels, &document),
        payments: reconcile::annotate_payments(payments, &document),
        summary,
    };

    info!(
        listed,
        payments = snapshot.summary.total_payments,
        parcels = snapshot.summary.total_parcels,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "reconcile_cycle_complete"
    );
    Ok(snapshot)
}
