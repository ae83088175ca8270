//! Parcel Grouper
//!
//! Pure, deterministic grouping of canonical payments into [`Parcel`]
//! aggregates by normalized shipping-address identity. No I/O, no clock, no
//! randomness: the same input always produces the same parcels with the
//! same ids, which is what lets the reconciler key persisted status off
//! parcel identity at all.
//!
//! Ordering guarantees:
//! - members keep their discovery order within a parcel;
//! - groups form in first-seen order;
//! - the final list is sorted by total amount, descending (display/triage
//!   convenience; ties keep first-seen order).

use std::collections::HashMap;

use normalize::Payment;

mod address;
mod types;

pub use crate::address::address_key;
pub use crate::types::Parcel;

/// Group payments into parcels. Every payment lands in exactly one parcel;
/// a lone payment still produces a one-member parcel.
pub fn group(payments: &[Payment]) -> Vec<Parcel> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&Payment>> = HashMap::new();

    for payment in payments {
        let key = address_key(&payment.shipping_address);
        match groups.get_mut(&key) {
            Some(members) => members.push(payment),
            None => {
                order.push(key.clone());
                groups.insert(key, vec![payment]);
            }
        }
    }

    let mut parcels: Vec<Parcel> = order
        .iter()
        .map(|key| build_parcel(&groups[key]))
        .collect();
    parcels.sort_by(|a, b| b.total_amount_minor_units.cmp(&a.total_amount_minor_units));
    parcels
}

// Groups are non-empty by construction.
fn build_parcel(members: &[&Payment]) -> Parcel {
    let mut customer_names: Vec<String> = Vec::new();
    let mut customer_emails: Vec<String> = Vec::new();
    let mut sizes: Vec<String> = Vec::new();
    let mut total_amount_minor_units = 0i64;

    for member in members {
        if !customer_names.contains(&member.customer_name) {
            customer_names.push(member.customer_name.clone());
        }
        if !customer_emails.contains(&member.customer_email) {
            customer_emails.push(member.customer_email.clone());
        }
        sizes.extend(member.sizes.iter().cloned());
        total_amount_minor_units += member.amount_minor_units;
    }

    Parcel {
        id: members
            .iter()
            .map(|member| id_tail(&member.id))
            .collect::<Vec<_>>()
            .join("/"),
        transaction_ids: members.iter().map(|member| member.id.clone()).collect(),
        customer_names,
        customer_emails,
        shipping_address: members[0].shipping_address.clone(),
        sizes,
        total_amount_minor_units,
    }
}

// Last 8 characters of a transaction id (char-boundary safe; shorter ids
// pass through whole).
fn id_tail(id: &str) -> &str {
    id.char_indices()
        .rev()
        .nth(7)
        .map(|(index, _)| &id[index..])
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{DateTime, Utc};
    use normalize::PostalAddress;

    use super::*;

    fn fixed_timestamp() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
    }

    fn address(line1: &str) -> PostalAddress {
        PostalAddress {
            line1: line1.into(),
            line2: None,
            city: "Arlington".into(),
            state: "VA".into(),
            postal_code: "22201".into(),
            country: "US".into(),
        }
    }

    fn payment(id: &str, line1: &str, amount: i64, sizes: &[&str]) -> Payment {
        Payment {
            id: id.into(),
            amount_minor_units: amount,
            currency: "usd".into(),
            customer_name: format!("Customer {id}"),
            customer_email: format!("{id}@example.com"),
            shipping_address: address(line1),
            sizes: sizes.iter().map(|s| s.to_string()).collect(),
            created_at: fixed_timestamp(),
        }
    }

    #[test]
    fn parcels_partition_the_input() {
        let payments = vec![
            payment("pi_0000000000000aaa", "1 Harbor St", 2500, &["S"]),
            payment("pi_0000000000000bbb", "2 River Rd", 2500, &["M"]),
            payment("pi_0000000000000ccc", "1 Harbor St", 2500, &["L"]),
        ];

        let parcels = group(&payments);
        let grouped_ids: Vec<&String> = parcels
            .iter()
            .flat_map(|parcel| parcel.transaction_ids.iter())
            .collect();

        assert_eq!(grouped_ids.len(), payments.len());
        let unique: HashSet<&String> = grouped_ids.iter().copied().collect();
        assert_eq!(unique.len(), payments.len());
    }

    #[test]
    fn same_address_groups_regardless_of_case() {
        let mut shouty = payment("pi_0000000000000bbb", "1 Harbor St", 1000, &[]);
        shouty.shipping_address.line1 = "1 HARBOR ST".into();
        shouty.shipping_address.city = "ARLINGTON".into();
        let payments = vec![
            payment("pi_0000000000000aaa", "1 Harbor St", 1000, &[]),
            shouty,
        ];

        let parcels = group(&payments);
        assert_eq!(parcels.len(), 1);
        assert_eq!(parcels[0].transaction_ids.len(), 2);
    }

    #[test]
    fn grouping_is_deterministic() {
        let payments = vec![
            payment("pi_0000000000000aaa", "1 Harbor St", 1500, &["S"]),
            payment("pi_0000000000000bbb", "1 Harbor St", 2500, &["M"]),
            payment("pi_0000000000000ccc", "2 River Rd", 500, &["L"]),
        ];

        let first: Vec<String> = group(&payments).into_iter().map(|p| p.id).collect();
        let second: Vec<String> = group(&payments).into_iter().map(|p| p.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn parcel_id_joins_member_id_tails() {
        let payments = vec![
            payment("pi_0000000000000aaa", "1 Harbor St", 1000, &[]),
            payment("pi_0000000000000bbb", "1 Harbor St", 1000, &[]),
        ];

        let parcels = group(&payments);
        assert_eq!(parcels[0].id, "00000aaa/00000bbb");
    }

    #[test]
    fn short_ids_pass_through_whole() {
        let payments = vec![payment("tx1", "1 Harbor St", 1000, &[])];
        let parcels = group(&payments);
        assert_eq!(parcels[0].id, "tx1");
    }

    #[test]
    fn aggregates_sum_and_concatenate() {
        let mut repeat_customer = payment("pi_0000000000000bbb", "1 Harbor St", 1500, &["M", "M"]);
        repeat_customer.customer_name = "Customer pi_0000000000000aaa".into();
        let payments = vec![
            payment("pi_0000000000000aaa", "1 Harbor St", 1000, &["S"]),
            repeat_customer,
        ];

        let parcels = group(&payments);
        let parcel = &parcels[0];
        assert_eq!(parcel.total_amount_minor_units, 2500);
        assert_eq!(parcel.sizes, vec!["S", "M", "M"]);
        // Same display name twice collapses; distinct emails don't.
        assert_eq!(parcel.customer_names.len(), 1);
        assert_eq!(parcel.customer_emails.len(), 2);
    }

    #[test]
    fn output_sorted_by_total_descending() {
        let payments = vec![
            payment("pi_0000000000000aaa", "1 Harbor St", 500, &[]),
            payment("pi_0000000000000bbb", "2 River Rd", 9000, &[]),
            payment("pi_0000000000000ccc", "3 Lake Ave", 2500, &[]),
        ];

        let totals: Vec<i64> = group(&payments)
            .into_iter()
            .map(|parcel| parcel.total_amount_minor_units)
            .collect();
        assert_eq!(totals, vec![9000, 2500, 500]);
    }

    #[test]
    fn single_payment_still_forms_a_parcel() {
        let payments = vec![payment("pi_0000000000000aaa", "1 Harbor St", 1000, &["S"])];
        let parcels = group(&payments);
        assert_eq!(parcels.len(), 1);
        assert_eq!(parcels[0].transaction_ids, vec!["pi_0000000000000aaa"]);
    }
}
