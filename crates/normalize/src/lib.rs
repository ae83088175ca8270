//! Payment Normalizer
//!
//! This is where transactions enter the fulfillment pipeline. The upstream
//! processor hands back loosely-structured records: customer identity spread
//! across up to three sub-structures, size labels hiding behind half a dozen
//! metadata aliases, and addresses with any field missing. We resolve all of
//! that into a canonical [`Payment`], or drop the record entirely.
//!
//! ## Rules of the road
//!
//! - **Shipping address is mandatory** - a payment without one is excluded
//!   from the pipeline. That's a filtered-out record, not an error.
//! - **Sizes are optional** - a payment with no resolvable size labels keeps
//!   an empty list and stays in.
//! - **Identity is best-effort** - name and email start from placeholders
//!   and are overridden by whichever sources are present, billing details
//!   taking highest priority.
//! - **Pure and synchronous** - the secondary checkout-session lookup is an
//!   I/O concern that belongs to the cycle orchestrator; this crate only
//!   merges its result via [`apply_session`].
//!
//! ## Example
//!
//! ```
//! use normalize::{normalize, RawPayment};
//!
//! let raw: RawPayment = serde_json::from_value(serde_json::json!({
//!     "id": "pi_1",
//!     "amount": 2500,
//!     "currency": "USD",
//!     "status": "succeeded",
//!     "created": 1700000000,
//!     "shipping": {
//!         "name": "Ada Lovelace",
//!         "address": { "line1": "1 Engine Way", "city": "London", "country": "GB" }
//!     },
//!     "metadata": { "size_1": "M" }
//! }))
//! .unwrap();
//!
//! let payment = normalize(&raw).expect("payment has an address");
//! assert_eq!(payment.customer_name, "Ada Lovelace");
//! assert_eq!(payment.currency, "usd");
//! assert_eq!(payment.sizes, vec!["M"]);
//! ```

use chrono::DateTime;
use tracing::debug;

mod customer;
mod sizes;
mod types;

use crate::customer::resolve_customer;

pub use crate::customer::{FALLBACK_EMAIL, FALLBACK_NAME};
pub use crate::sizes::{
    session_email, sizes_from_metadata, sizes_from_session, METADATA_SIZE_KEYS,
};
pub use crate::types::{
    CheckoutSession, CustomField, CustomFieldValue, CustomerDetails, Expandable, Payment,
    PostalAddress, RawAddress, RawBillingDetails, RawCharge, RawCustomer, RawPayment, RawShipping,
};

/// Upstream status value a transaction must carry to enter the pipeline.
pub const SUCCEEDED: &str = "succeeded";

/// Normalize one raw payment into canonical form.
///
/// Returns `None` when the record has no resolvable shipping address; every
/// other gap is papered over with placeholders, empty strings, or an empty
/// size list.
pub fn normalize(raw: &RawPayment) -> Option<Payment> {
    let Some(shipping) = raw.shipping.as_ref() else {
        debug!(payment_id = %raw.id, "payment_without_shipping_skipped");
        return None;
    };
    let Some(address) = shipping.address.as_ref() else {
        debug!(payment_id = %raw.id, "payment_without_address_skipped");
        return None;
    };

    let (customer_name, customer_email) = resolve_customer(raw);
    // The shipping contact is who the parcel is addressed to; prefer it over
    // whatever identity the billing side resolved.
    let customer_name = shipping.name.clone().unwrap_or(customer_name);

    Some(Payment {
        id: raw.id.clone(),
        amount_minor_units: raw.amount,
        currency: raw.currency.to_ascii_lowercase(),
        customer_name,
        customer_email,
        shipping_address: PostalAddress::from_raw(address),
        sizes: sizes_from_metadata(&raw.metadata),
        created_at: DateTime::from_timestamp(raw.created, 0).unwrap_or_default(),
    })
}

/// Merge a best-effort checkout-session lookup into an already-normalized
/// payment: session-sourced sizes are appended, and the session email fills
/// in only while the placeholder is still in place.
pub fn apply_session(payment: &mut Payment, session: &CheckoutSession) {
    payment.sizes.extend(sizes_from_session(session));

    if payment.customer_email == FALLBACK_EMAIL {
        if let Some(email) = session_email(session) {
            payment.customer_email = email.to_string();
        }
    }
}
