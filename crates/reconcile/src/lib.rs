//! Status Reconciler
//!
//! Payments and parcels are recomputed fresh every cycle; shipment status
//! lives in the persisted store. This crate merges the two. That would be
//! trivial if parcel identity were stable; it is not. A parcel's composite
//! id changes whenever re-grouping changes its membership (a new transaction
//! joins a previously-shipped address, address normalization drifts), so
//! lookup runs in two tiers:
//!
//! 1. **Direct**: the current parcel id is a key in the store; apply that
//!    record.
//! 2. **Fallback**: find a record through any member transaction id in the
//!    store's flattened membership index. Applied only when every member of
//!    the current parcel maps to the same stored status; a mixed parcel
//!    stays `pending` rather than guessing.
//!
//! Payments are annotated independently through the same flattened index, so
//! a payment's displayed status can disagree with its parcel's during the
//! window where the two lookups diverge. That inconsistency is acknowledged
//! and accepted.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use normalize::Payment;
use parcel::Parcel;
use serde::{Deserialize, Serialize};
use store::{ShipmentStatus, StatusDocument, StatusRecord};
use tracing::debug;

/// A parcel with persisted status merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledParcel {
    #[serde(flatten)]
    pub parcel: Parcel,
    pub status: ShipmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<DateTime<Utc>>,
}

/// A payment annotated with its store-derived status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledPayment {
    #[serde(flatten)]
    pub payment: Payment,
    pub status: ShipmentStatus,
}

/// Merge persisted status onto freshly grouped parcels.
pub fn reconcile_parcels(
    parcels: Vec<Parcel>,
    document: &StatusDocument,
) -> Vec<ReconciledParcel> {
    let index = document.transaction_index();

    parcels
        .into_iter()
        .map(|parcel| {
            if let Some(record) = document.parcels.get(&parcel.id) {
                return with_record(parcel, record);
            }
            if let Some(record) = fallback_record(&parcel, &index) {
                debug!(parcel_id = %parcel.id, "parcel_status_recovered_via_membership");
                return with_record(parcel, record);
            }
            with_default(parcel)
        })
        .collect()
}

/// Annotate payments with status from the flattened membership index,
/// independent of any parcel-level match.
pub fn annotate_payments(
    payments: Vec<Payment>,
    document: &StatusDocument,
) -> Vec<ReconciledPayment> {
    let index = document.transaction_index();

    payments
        .into_iter()
        .map(|payment| {
            let status = index
                .get(payment.id.as_str())
                .map(|record| record.status)
                .unwrap_or_default();
            ReconciledPayment { payment, status }
        })
        .collect()
}

fn with_record(parcel: Parcel, record: &StatusRecord) -> ReconciledParcel {
    ReconciledParcel {
        parcel,
        status: record.status,
        tracking_number: record.tracking_number.clone(),
        shipped_at: record.shipped_at,
    }
}

fn with_default(parcel: Parcel) -> ReconciledParcel {
    ReconciledParcel {
        parcel,
        status: ShipmentStatus::default(),
        tracking_number: None,
        shipped_at: None,
    }
}

// A record found through membership counts only if the whole parcel agrees:
// every member must resolve to the same stored status. Members unknown to
// the store count as disagreement.
fn fallback_record<'doc>(
    parcel: &Parcel,
    index: &HashMap<&str, &'doc StatusRecord>,
) -> Option<&'doc StatusRecord> {
    let found = parcel
        .transaction_ids
        .iter()
        .find_map(|id| index.get(id.as_str()).copied())?;

    let unanimous = parcel.transaction_ids.iter().all(|id| {
        index.get(id.as_str()).map(|record| record.status) == Some(found.status)
    });

    unanimous.then_some(found)
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use normalize::PostalAddress;

    use super::*;

    fn payment(id: &str, line1: &str) -> Payment {
        Payment {
            id: id.into(),
            amount_minor_units: 1000,
            currency: "usd".into(),
            customer_name: "Customer".into(),
            customer_email: "customer@example.com".into(),
            shipping_address: PostalAddress {
                line1: line1.into(),
                line2: None,
                city: "Arlington".into(),
                state: "VA".into(),
                postal_code: "22201".into(),
                country: "US".into(),
            },
            sizes: vec![],
            created_at: DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
        }
    }

    fn shipped_record(ids: &[&str], tracking: Option<&str>) -> StatusRecord {
        StatusRecord {
            status: ShipmentStatus::Shipped,
            transaction_ids: ids.iter().map(|id| id.to_string()).collect(),
            shipped_at: DateTime::from_timestamp(1_700_100_000, 0),
            tracking_number: tracking.map(str::to_string),
            updated_at: DateTime::from_timestamp(1_700_100_000, 0).expect("valid timestamp"),
        }
    }

    #[test]
    fn empty_store_leaves_everything_pending() {
        let parcels = parcel::group(&[payment("pi_0000000000000aaa", "1 Harbor St")]);
        let reconciled = reconcile_parcels(parcels, &StatusDocument::empty());
        assert_eq!(reconciled[0].status, ShipmentStatus::Pending);
        assert!(reconciled[0].tracking_number.is_none());
    }

    #[test]
    fn direct_match_applies_record() {
        let parcels = parcel::group(&[
            payment("pi_0000000000000aaa", "1 Harbor St"),
            payment("pi_0000000000000bbb", "1 Harbor St"),
        ]);
        let mut document = StatusDocument::empty();
        document.parcels.insert(
            parcels[0].id.clone(),
            shipped_record(
                &["pi_0000000000000aaa", "pi_0000000000000bbb"],
                Some("1Z999"),
            ),
        );

        let reconciled = reconcile_parcels(parcels, &document);
        assert_eq!(reconciled[0].status, ShipmentStatus::Shipped);
        assert_eq!(reconciled[0].tracking_number.as_deref(), Some("1Z999"));
        assert!(reconciled[0].shipped_at.is_some());
    }

    #[test]
    fn fallback_matches_subset_membership() {
        // Status was written when the parcel contained two transactions; one
        // of them later re-grouped away. The survivor still resolves.
        let parcels = parcel::group(&[payment("pi_0000000000000aaa", "1 Harbor St")]);
        let mut document = StatusDocument::empty();
        document.parcels.insert(
            "00000aaa/00000bbb".into(),
            shipped_record(&["pi_0000000000000aaa", "pi_0000000000000bbb"], None),
        );

        let reconciled = reconcile_parcels(parcels, &document);
        assert_eq!(reconciled[0].status, ShipmentStatus::Shipped);
    }

    #[test]
    fn mixed_membership_stays_pending() {
        // A new transaction joined a previously shipped address: the parcel's
        // id changed AND one member is unknown to the store. Don't guess.
        let parcels = parcel::group(&[
            payment("pi_0000000000000aaa", "1 Harbor St"),
            payment("pi_0000000000000ccc", "1 Harbor St"),
        ]);
        let mut document = StatusDocument::empty();
        document.parcels.insert(
            "00000aaa".into(),
            shipped_record(&["pi_0000000000000aaa"], None),
        );

        let reconciled = reconcile_parcels(parcels, &document);
        assert_eq!(reconciled[0].status, ShipmentStatus::Pending);
    }

    #[test]
    fn disagreeing_members_stay_pending() {
        let parcels = parcel::group(&[
            payment("pi_0000000000000aaa", "1 Harbor St"),
            payment("pi_0000000000000bbb", "1 Harbor St"),
        ]);
        let mut document = StatusDocument::empty();
        document.parcels.insert(
            "00000aaa".into(),
            shipped_record(&["pi_0000000000000aaa"], None),
        );
        let mut delivered = shipped_record(&["pi_0000000000000bbb"], None);
        delivered.status = ShipmentStatus::Delivered;
        document.parcels.insert("00000bbb".into(), delivered);

        let reconciled = reconcile_parcels(parcels, &document);
        assert_eq!(reconciled[0].status, ShipmentStatus::Pending);
    }

    #[test]
    fn unanimous_members_resolve_through_fallback() {
        let parcels = parcel::group(&[
            payment("pi_0000000000000aaa", "1 Harbor St"),
            payment("pi_0000000000000bbb", "1 Harbor St"),
        ]);
        let mut document = StatusDocument::empty();
        document.parcels.insert(
            "stale/id".into(),
            shipped_record(
                &["pi_0000000000000aaa", "pi_0000000000000bbb"],
                Some("1Z999"),
            ),
        );

        let reconciled = reconcile_parcels(parcels, &document);
        assert_eq!(reconciled[0].status, ShipmentStatus::Shipped);
        assert_eq!(reconciled[0].tracking_number.as_deref(), Some("1Z999"));
    }

    #[test]
    fn payments_annotate_independently() {
        let payments = vec![
            payment("pi_0000000000000aaa", "1 Harbor St"),
            payment("pi_0000000000000ccc", "2 River Rd"),
        ];
        let mut document = StatusDocument::empty();
        document.parcels.insert(
            "00000aaa".into(),
            shipped_record(&["pi_0000000000000aaa"], None),
        );

        let annotated = annotate_payments(payments, &document);
        assert_eq!(annotated[0].status, ShipmentStatus::Shipped);
        assert_eq!(annotated[1].status, ShipmentStatus::Pending);
    }

    #[test]
    fn reconciled_views_serialize_flattened() {
        let parcels = parcel::group(&[payment("pi_0000000000000aaa", "1 Harbor St")]);
        let reconciled = reconcile_parcels(parcels, &StatusDocument::empty());

        let json = serde_json::to_value(&reconciled[0]).expect("parcel should encode");
        assert_eq!(json["status"], "pending");
        assert!(json.get("transactionIds").is_some());
        assert!(json.get("totalAmountMinorUnits").is_some());
        assert!(json.get("parcel").is_none());
    }
}
