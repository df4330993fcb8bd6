//! Vendor ownership checks.
//!
//! Marketplace plugins record which vendor an order belongs to in different places depending on version and site
//! setup, so ownership is established from several locations, in order:
//!
//! 1. the order's `meta_data`, under any of [`ORDER_META_VENDOR_KEYS`];
//! 2. each line item's `meta_data` (under [`LINE_ITEM_META_VENDOR_KEYS`]) and its `vendor_id` field;
//! 3. the top-level order fields in [`ORDER_VENDOR_FIELDS`].
//!
//! The check is a pure function and fails closed: an order without evidence for the vendor does not belong to it.
//! It is used both to filter fetched batches and as the final gate before an order is dispatched.
use dpa_common::VendorId;
use log::*;
use woo_tools::Order;

pub const ORDER_META_VENDOR_KEYS: [&str; 6] =
    ["_dokan_vendor_id", "dokan_vendor_id", "_vendor_id", "vendor_id", "_store_id", "store_owner_id"];
pub const LINE_ITEM_META_VENDOR_KEYS: [&str; 3] = ["_dokan_vendor_id", "vendor_id", "_vendor_id"];
pub const ORDER_VENDOR_FIELDS: [&str; 5] = ["store_id", "vendor_id", "seller_id", "store_owner_id", "dokan_vendor_id"];

/// Where the proof of ownership was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnershipEvidence {
    OrderMeta(String),
    LineItemMeta(String),
    LineItemVendorField,
    OrderField(String),
}

/// Returns the first piece of evidence that `order` belongs to `vendor_id`, if there is any.
pub fn ownership_evidence(order: &Order, vendor_id: &VendorId) -> Option<OwnershipEvidence> {
    if vendor_id.is_empty() {
        return None;
    }
    let in_order_meta = order
        .meta_data
        .iter()
        .find(|m| ORDER_META_VENDOR_KEYS.contains(&m.key.as_str()) && vendor_id.matches(&m.value))
        .map(|m| OwnershipEvidence::OrderMeta(m.key.clone()));
    if in_order_meta.is_some() {
        return in_order_meta;
    }
    for item in &order.line_items {
        let in_item_meta = item
            .meta_data
            .iter()
            .find(|m| LINE_ITEM_META_VENDOR_KEYS.contains(&m.key.as_str()) && vendor_id.matches(&m.value));
        if let Some(m) = in_item_meta {
            return Some(OwnershipEvidence::LineItemMeta(m.key.clone()));
        }
        if item.vendor_id.as_ref().is_some_and(|v| vendor_id.matches(v)) {
            return Some(OwnershipEvidence::LineItemVendorField);
        }
    }
    ORDER_VENDOR_FIELDS
        .iter()
        .find(|field| order.extra.get(**field).is_some_and(|v| vendor_id.matches(v)))
        .map(|field| OwnershipEvidence::OrderField(field.to_string()))
}

/// True if the order carries evidence that it belongs to `vendor_id`. An empty vendor id owns nothing.
pub fn belongs_to_vendor(order: &Order, vendor_id: &VendorId) -> bool {
    match ownership_evidence(order, vendor_id) {
        Some(evidence) => {
            trace!("🔐 Order {} belongs to vendor {vendor_id} ({evidence:?})", order.id);
            true
        },
        None => false,
    }
}

/// Keeps only the orders that belong to `vendor_id`, logging the ids of everything that was discarded.
pub fn filter_by_vendor(orders: Vec<Order>, vendor_id: &VendorId) -> Vec<Order> {
    let total = orders.len();
    let (owned, foreign): (Vec<Order>, Vec<Order>) = orders.into_iter().partition(|o| belongs_to_vendor(o, vendor_id));
    if !foreign.is_empty() {
        let ids = foreign.iter().map(|o| o.id.to_string()).collect::<Vec<String>>().join(", ");
        warn!("🔐 Discarded {} of {total} orders not owned by vendor {vendor_id}: {ids}", foreign.len());
    }
    debug!("🔐 {} of {total} orders belong to vendor {vendor_id}", owned.len());
    owned
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::test_utils::{bare_order, order_from_json, order_with_meta};

    #[test]
    fn order_meta_is_checked_first() {
        let order = order_with_meta("100", "_dokan_vendor_id", json!("7"));
        assert!(belongs_to_vendor(&order, &VendorId::from("7")));
        assert_eq!(
            ownership_evidence(&order, &VendorId::from("7")),
            Some(OwnershipEvidence::OrderMeta("_dokan_vendor_id".into()))
        );
        assert!(!belongs_to_vendor(&order, &VendorId::from("9")));
    }

    #[test]
    fn every_order_meta_alias_counts() {
        for key in ORDER_META_VENDOR_KEYS {
            let order = order_with_meta("1", key, json!(7));
            assert!(belongs_to_vendor(&order, &VendorId::from("7")), "{key} should be accepted");
        }
        let order = order_with_meta("1", "_customer_user", json!(7));
        assert!(!belongs_to_vendor(&order, &VendorId::from("7")));
    }

    #[test]
    fn numeric_and_string_ids_are_equivalent() {
        let order = order_with_meta("1", "_dokan_vendor_id", json!(42));
        assert!(belongs_to_vendor(&order, &VendorId::from("42")));
        let order = order_with_meta("1", "_dokan_vendor_id", json!("42"));
        assert!(belongs_to_vendor(&order, &VendorId::from(42u64)));
    }

    #[test]
    fn line_item_evidence() {
        let order = order_from_json(json!({
            "id": 2,
            "line_items": [
                { "name": "Soup", "meta_data": [{ "key": "_reduced_stock", "value": "1" }] },
                { "name": "Bread", "meta_data": [{ "key": "_vendor_id", "value": "7" }] }
            ]
        }));
        assert_eq!(
            ownership_evidence(&order, &VendorId::from("7")),
            Some(OwnershipEvidence::LineItemMeta("_vendor_id".into()))
        );
        // store_id is only an alias on the order itself, not on line items
        let order = order_from_json(json!({
            "id": 3,
            "line_items": [{ "name": "Bread", "meta_data": [{ "key": "_store_id", "value": "7" }] }]
        }));
        assert!(!belongs_to_vendor(&order, &VendorId::from("7")));
        let order = order_from_json(json!({ "id": 4, "line_items": [{ "name": "Bread", "vendor_id": 7 }] }));
        assert_eq!(ownership_evidence(&order, &VendorId::from("7")), Some(OwnershipEvidence::LineItemVendorField));
    }

    #[test]
    fn top_level_fields() {
        for field in ORDER_VENDOR_FIELDS {
            let mut raw = json!({ "id": 5 });
            raw[field] = json!(7);
            let order = order_from_json(raw);
            assert_eq!(
                ownership_evidence(&order, &VendorId::from("7")),
                Some(OwnershipEvidence::OrderField(field.to_string()))
            );
        }
    }

    #[test]
    fn fails_closed() {
        let vendor = VendorId::from("7");
        assert!(!belongs_to_vendor(&bare_order("6"), &vendor));
        let order = order_from_json(json!({
            "id": 6,
            "store_id": null,
            "vendor_id": { "id": 7 },
            "meta_data": [{ "key": "_dokan_vendor_id", "value": [7] }, { "key": "vendor_id" }],
            "line_items": [{ "name": "x", "vendor_id": true }]
        }));
        assert!(!belongs_to_vendor(&order, &vendor));
        let owned = order_with_meta("7", "_dokan_vendor_id", json!("7"));
        assert!(!belongs_to_vendor(&owned, &VendorId::default()));
        assert!(!belongs_to_vendor(&owned, &VendorId::from("  ")));
    }

    #[test]
    fn batch_filter_keeps_only_owned_orders() {
        let orders = vec![
            order_with_meta("1", "_dokan_vendor_id", json!("7")),
            order_with_meta("2", "_dokan_vendor_id", json!("9")),
            bare_order("3"),
            order_from_json(json!({ "id": 4, "seller_id": "7" })),
        ];
        let kept = filter_by_vendor(orders, &VendorId::from("7"));
        assert_eq!(kept.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(), vec!["1", "4"]);
    }
}
