use normalize::PostalAddress;
use serde::{Deserialize, Serialize};

/// A shipping unit: every payment headed to the same normalized address.
///
/// Parcels are views, recomputed from scratch on every cycle and never
/// persisted. The id is a composite of the member transaction ids, so it
/// changes whenever membership changes; status recovery across such changes
/// is the reconciler's job, not this type's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    /// Last 8 characters of each member transaction id, joined with `/`, in
    /// member order. Compact and human-legible; collisions are accepted
    /// since only within-run stability is required.
    pub id: String,
    /// Member payment ids in discovery order.
    pub transaction_ids: Vec<String>,
    /// De-duplicated member names, first-seen order.
    pub customer_names: Vec<String>,
    /// De-duplicated member emails, first-seen order.
    pub customer_emails: Vec<String>,
    /// Representative address; all members share it by construction.
    pub shipping_address: PostalAddress,
    /// Concatenated member size lists. Duplicates retained: each unit counts.
    pub sizes: Vec<String>,
    pub total_amount_minor_units: i64,
}
