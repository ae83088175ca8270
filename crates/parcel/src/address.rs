//! Address identity.
//!
//! Two payments belong to the same parcel iff their normalized address keys
//! are byte-identical. The key is a case-folded, pipe-joined tuple of every
//! address field with missing `line2` collapsing to the empty string, which
//! makes the grouping relation a strict equivalence.

use normalize::PostalAddress;

/// Normalized grouping key for a shipping address.
pub fn address_key(address: &PostalAddress) -> String {
    [
        address.line1.as_str(),
        address.line2.as_deref().unwrap_or(""),
        address.city.as_str(),
        address.state.as_str(),
        address.postal_code.as_str(),
        address.country.as_str(),
    ]
    .join("|")
    .to_lowercase()
}
