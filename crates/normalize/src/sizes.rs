//! Size/variant extraction.
//!
//! Size labels were entered through several generations of checkout forms,
//! so they hide under a handful of key aliases in two places: the payment's
//! own metadata map and, failing that, the checkout session's metadata and
//! custom-field list. Matches are appended in discovery order and never
//! de-duplicated (two "M" entries mean two medium units).

use std::collections::BTreeMap;

use crate::types::CheckoutSession;

/// Metadata key aliases checked on the payment itself, in priority order.
pub const METADATA_SIZE_KEYS: [&str; 6] = [
    "custom_field_1",
    "custom_field_2",
    "shirt_size_1",
    "shirt_size_2",
    "size_1",
    "size_2",
];

/// Aliases checked in checkout-session metadata. The older session forms
/// never wrote `size_1`/`size_2`, so those two are not consulted here.
const SESSION_METADATA_KEYS: [&str; 4] = [
    "custom_field_1",
    "custom_field_2",
    "shirt_size_1",
    "shirt_size_2",
];

/// Collect size labels from a payment's metadata map.
pub fn sizes_from_metadata(metadata: &BTreeMap<String, String>) -> Vec<String> {
    METADATA_SIZE_KEYS
        .iter()
        .filter_map(|key| metadata.get(*key))
        .filter(|value| !value.is_empty())
        .cloned()
        .collect()
}

/// Collect size labels from a checkout session: metadata aliases first, then
/// every custom field whose key looks size-related.
pub fn sizes_from_session(session: &CheckoutSession) -> Vec<String> {
    let mut sizes: Vec<String> = SESSION_METADATA_KEYS
        .iter()
        .filter_map(|key| session.metadata.get(*key))
        .filter(|value| !value.is_empty())
        .cloned()
        .collect();

    for field in &session.custom_fields {
        if !is_size_key(&field.key) {
            continue;
        }
        if let Some(value) = field.value() {
            if !value.is_empty() {
                sizes.push(value.to_string());
            }
        }
    }

    sizes
}

/// Email captured by the checkout session, if any.
pub fn session_email(session: &CheckoutSession) -> Option<&str> {
    session
        .customer_details
        .as_ref()
        .and_then(|details| details.email.as_deref())
}

// The generic custom-field slots don't carry "size" in their key, so they
// are matched explicitly alongside the substring check.
fn is_size_key(key: &str) -> bool {
    key.contains("size") || key == "custom_field_1" || key == "custom_field_2"
}
