//! Customer identity resolution.
//!
//! Identity can arrive in up to three places on one transaction: the
//! expanded customer object, the receipt email, and the latest charge's
//! billing details. Resolution starts from placeholders and lets later
//! sources override earlier ones, billing details last.

use crate::types::RawPayment;

/// Name used when no source resolves a customer name.
pub const FALLBACK_NAME: &str = "Unknown";

/// Email used when no source resolves a customer email.
pub const FALLBACK_EMAIL: &str = "unknown@email.com";

/// Resolve `(name, email)` for one raw payment.
pub(crate) fn resolve_customer(raw: &RawPayment) -> (String, String) {
    let mut name = FALLBACK_NAME.to_string();
    let mut email = FALLBACK_EMAIL.to_string();

    // Expanded customer object, unless the customer was deleted upstream.
    if let Some(customer) = raw.customer.as_ref().and_then(|c| c.object()) {
        if !customer.deleted {
            if let Some(value) = &customer.name {
                name = value.clone();
            }
            if let Some(value) = &customer.email {
                email = value.clone();
            }
        }
    }

    if let Some(receipt) = &raw.receipt_email {
        email = receipt.clone();
    }

    // Billing details from the expanded latest charge win over everything.
    if let Some(charge) = raw.latest_charge.as_ref().and_then(|c| c.object()) {
        if let Some(billing) = &charge.billing_details {
            if let Some(value) = &billing.email {
                email = value.clone();
            }
            if let Some(value) = &billing.name {
                name = value.clone();
            }
        }
    }

    (name, email)
}
