//! Label Exporter
//!
//! Turns a filtered set of parcels (callers pass only the `pending` ones)
//! into a flat CSV for a generic shipping-label upload. Pure over its input:
//! one row per parcel, a fixed column set, every field quote-wrapped.
//!
//! The weight column is a heuristic, not a measurement: single-item parcels
//! leave it empty so the carrier default applies, a two-item parcel gets a
//! fixed padded-envelope weight, and larger parcels scale linearly per item.

use reconcile::ReconciledParcel;
use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;

/// Fixed weight for a two-item parcel, in ounces.
const TWO_ITEM_WEIGHT_OZ: f64 = 13.4;

/// Per-item weight used for parcels of three or more items, in ounces.
const PER_ITEM_WEIGHT_OZ: i64 = 7;

/// Garment sizes in display order. Anything unrecognized sorts after these,
/// alphabetically.
const SIZE_ORDER: [&str; 6] = ["s", "m", "l", "xl", "xxl", "2xl"];

/// Errors from rendering the label CSV.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExportError {
    #[error("failed to encode label rows: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush label csv: {0}")]
    Flush(String),

    #[error("label csv was not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// One shipping-label upload row. Field renames double as the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Address Line 1")]
    pub address_line1: String,
    #[serde(rename = "Address Line 2")]
    pub address_line2: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Postal Code")]
    pub postal_code: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Weight (oz)")]
    pub weight: String,
    #[serde(rename = "Parcel ID")]
    pub parcel_id: String,
    #[serde(rename = "Items")]
    pub items: String,
}

/// Build one label row per parcel. The representative name and email are
/// the first entries of the parcel's de-duplicated sets.
pub fn label_rows(parcels: &[ReconciledParcel]) -> Vec<LabelRow> {
    parcels
        .iter()
        .map(|reconciled| {
            let parcel = &reconciled.parcel;
            let address = &parcel.shipping_address;
            LabelRow {
                name: parcel.customer_names.first().cloned().unwrap_or_default(),
                email: parcel.customer_emails.first().cloned().unwrap_or_default(),
                address_line1: address.line1.clone(),
                address_line2: address.line2.clone().unwrap_or_default(),
                city: address.city.clone(),
                state: address.state.clone(),
                postal_code: address.postal_code.clone(),
                country: address.country.clone(),
                weight: weight_estimate(item_count(reconciled)),
                parcel_id: parcel.id.clone(),
                items: item_summary(reconciled),
            }
        })
        .collect()
}

/// Render rows as CSV with a header line and every field quoted.
pub fn render_csv(rows: &[LabelRow]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Sort size labels into display order: the known garment ladder first,
/// then unrecognized labels alphabetically.
pub fn sort_sizes(sizes: &[String]) -> Vec<String> {
    let mut sorted = sizes.to_vec();
    sorted.sort_by(|a, b| match (size_rank(a), size_rank(b)) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.to_lowercase().cmp(&b.to_lowercase()),
    });
    sorted
}

fn size_rank(size: &str) -> Option<usize> {
    SIZE_ORDER
        .iter()
        .position(|known| known.eq_ignore_ascii_case(size))
}

// Units in the parcel. Size labels count one unit each; a parcel whose
// payments carried no size metadata still ships one unit per transaction.
fn item_count(reconciled: &ReconciledParcel) -> usize {
    let parcel = &reconciled.parcel;
    if parcel.sizes.is_empty() {
        parcel.transaction_ids.len()
    } else {
        parcel.sizes.len()
    }
}

fn weight_estimate(item_count: usize) -> String {
    match item_count {
        0 | 1 => String::new(),
        2 => TWO_ITEM_WEIGHT_OZ.to_string(),
        n => (PER_ITEM_WEIGHT_OZ * n as i64).to_string(),
    }
}

fn item_summary(reconciled: &ReconciledParcel) -> String {
    let count = item_count(reconciled);
    let noun = if count == 1 { "item" } else { "items" };

    let sizes = &reconciled.parcel.sizes;
    if sizes.is_empty() {
        return format!("{count} {noun}");
    }

    let listed = sort_sizes(sizes)
        .iter()
        .map(|size| size.to_uppercase())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{count} {noun}: {listed}")
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use normalize::{Payment, PostalAddress};
    use store::ShipmentStatus;

    use super::*;

    fn payment(id: &str, sizes: &[&str]) -> Payment {
        Payment {
            id: id.into(),
            amount_minor_units: 1000,
            currency: "usd".into(),
            customer_name: "Grace Hopper".into(),
            customer_email: "grace@example.com".into(),
            shipping_address: PostalAddress {
                line1: "1 Harbor St".into(),
                line2: Some("Apt 2".into()),
                city: "Arlington".into(),
                state: "VA".into(),
                postal_code: "22201".into(),
                country: "US".into(),
            },
            sizes: sizes.iter().map(|s| s.to_string()).collect(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
        }
    }

    fn pending_parcel(payments: &[Payment]) -> ReconciledParcel {
        let grouped = parcel::group(payments);
        assert_eq!(grouped.len(), 1, "fixture payments must share an address");
        ReconciledParcel {
            parcel: grouped.into_iter().next().unwrap(),
            status: ShipmentStatus::Pending,
            tracking_number: None,
            shipped_at: None,
        }
    }

    #[test]
    fn single_item_parcel_leaves_weight_empty() {
        let parcel = pending_parcel(&[payment("pi_0000000000000aaa", &["M"])]);
        let rows = label_rows(&[parcel]);
        assert_eq!(rows[0].weight, "");
    }

    #[test]
    fn two_item_parcel_uses_fixed_weight() {
        let parcel = pending_parcel(&[payment("pi_0000000000000aaa", &["M", "L"])]);
        let rows = label_rows(&[parcel]);
        assert_eq!(rows[0].weight, "13.4");
    }

    #[test]
    fn larger_parcels_scale_linearly() {
        let parcel = pending_parcel(&[payment("pi_0000000000000aaa", &["S", "S", "M", "L", "XL"])]);
        let rows = label_rows(&[parcel]);
        assert_eq!(rows[0].weight, "35");
    }

    #[test]
    fn sizeless_parcel_counts_transactions() {
        let parcel = pending_parcel(&[
            payment("pi_0000000000000aaa", &[]),
            payment("pi_0000000000000bbb", &[]),
        ]);
        let rows = label_rows(&[parcel]);
        assert_eq!(rows[0].weight, "13.4");
        assert_eq!(rows[0].items, "2 items");
    }

    #[test]
    fn item_summary_sorts_and_uppercases() {
        let parcel = pending_parcel(&[payment(
            "pi_0000000000000aaa",
            &["XL", "S", "custom", "M"],
        )]);
        let rows = label_rows(&[parcel]);
        assert_eq!(rows[0].items, "4 items: S, M, XL, CUSTOM");
    }

    #[test]
    fn unrecognized_sizes_sort_alphabetically_after_known() {
        let sizes: Vec<String> = ["zeta", "2XL", "alpha", "xxl"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(sort_sizes(&sizes), vec!["xxl", "2XL", "alpha", "zeta"]);
    }

    #[test]
    fn row_carries_address_and_identity() {
        let parcel = pending_parcel(&[payment("pi_0000000000000aaa", &["M"])]);
        let rows = label_rows(&[parcel]);
        let row = &rows[0];
        assert_eq!(row.name, "Grace Hopper");
        assert_eq!(row.email, "grace@example.com");
        assert_eq!(row.address_line1, "1 Harbor St");
        assert_eq!(row.address_line2, "Apt 2");
        assert_eq!(row.postal_code, "22201");
        assert_eq!(row.parcel_id, "00000aaa");
        assert_eq!(row.items, "1 item: M");
    }

    #[test]
    fn csv_quotes_every_field() {
        let parcel = pending_parcel(&[payment("pi_0000000000000aaa", &["M"])]);
        let csv = render_csv(&label_rows(&[parcel])).unwrap();

        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert_eq!(
            header,
            "\"Name\",\"Email\",\"Address Line 1\",\"Address Line 2\",\"City\",\"State\",\
             \"Postal Code\",\"Country\",\"Weight (oz)\",\"Parcel ID\",\"Items\""
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("\"Grace Hopper\",\"grace@example.com\""));
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let mut named = payment("pi_0000000000000aaa", &["M"]);
        named.customer_name = "Grace \"Amazing\" Hopper".into();
        let parcel = pending_parcel(&[named]);

        let csv = render_csv(&label_rows(&[parcel])).unwrap();
        assert!(csv.contains("\"Grace \"\"Amazing\"\" Hopper\""));
    }
}
