//! Wire and canonical payment types.
//!
//! The `Raw*` structs mirror the upstream processor's JSON as loosely as the
//! processor itself does: nearly everything is optional, identity data is
//! spread across three sub-structures, and expandable references may come
//! back as bare id strings instead of objects. [`Payment`] is the canonical
//! shape the rest of the pipeline works with.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An upstream reference that may arrive expanded (full object) or collapsed
/// (bare id string), depending on the listing's `expand[]` parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Object(T),
    Id(String),
}

impl<T> Expandable<T> {
    /// The expanded object, if this reference was expanded.
    pub fn object(&self) -> Option<&T> {
        match self {
            Expandable::Object(inner) => Some(inner),
            Expandable::Id(_) => None,
        }
    }
}

/// One transaction as listed by the upstream processor.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPayment {
    pub id: String,
    /// Amount in the currency's smallest unit. Never a float.
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    /// Upstream lifecycle status, e.g. `"succeeded"`.
    #[serde(default)]
    pub status: String,
    /// Creation time as unix seconds.
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub customer: Option<Expandable<RawCustomer>>,
    #[serde(default)]
    pub receipt_email: Option<String>,
    #[serde(default)]
    pub latest_charge: Option<Expandable<RawCharge>>,
    #[serde(default)]
    pub shipping: Option<RawShipping>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCustomer {
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCharge {
    #[serde(default)]
    pub billing_details: Option<RawBillingDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBillingDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawShipping {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<RawAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAddress {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Checkout-session lookup result, consulted as a secondary size/email
/// source when a payment's own metadata carries nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutSession {
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomField {
    pub key: String,
    #[serde(default)]
    pub text: Option<CustomFieldValue>,
    #[serde(default)]
    pub numeric: Option<CustomFieldValue>,
    #[serde(default)]
    pub dropdown: Option<CustomFieldValue>,
}

impl CustomField {
    /// The field's value, preferring text over numeric over dropdown.
    pub fn value(&self) -> Option<&str> {
        self.text
            .as_ref()
            .and_then(|v| v.value.as_deref())
            .or_else(|| self.numeric.as_ref().and_then(|v| v.value.as_deref()))
            .or_else(|| self.dropdown.as_ref().and_then(|v| v.value.as_deref()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomFieldValue {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

/// Canonical payment record: one successful upstream transaction with
/// identity, address, and variant data resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Opaque upstream id. Stable across re-fetches; the primary identity
    /// everything else keys off.
    pub id: String,
    pub amount_minor_units: i64,
    /// Lowercase ISO-4217-style code.
    pub currency: String,
    pub customer_name: String,
    pub customer_email: String,
    pub shipping_address: PostalAddress,
    /// Free-text variant labels in discovery order; may be empty.
    pub sizes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Structured postal address. Missing upstream fields collapse to empty
/// strings; only `line2` stays optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl PostalAddress {
    pub(crate) fn from_raw(raw: &RawAddress) -> Self {
        Self {
            line1: raw.line1.clone().unwrap_or_default(),
            line2: raw.line2.clone(),
            city: raw.city.clone().unwrap_or_default(),
            state: raw.state.clone().unwrap_or_default(),
            postal_code: raw.postal_code.clone().unwrap_or_default(),
            country: raw.country.clone().unwrap_or_default(),
        }
    }
}
