use async_trait::async_trait;
use dpa_common::{OrderId, VendorId};
use mockall::mock;
use serde_json::{json, Value};
use woo_tools::{Order, OrderQuery, Store, WooApiError, WpUser};

use crate::traits::DokanApi;

mock! {
    pub Dokan {}
    #[async_trait]
    impl DokanApi for Dokan {
        async fn fetch_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, WooApiError>;
        async fn fetch_vendor_endpoint_orders(&self, vendor_id: &VendorId, per_page: u32) -> Result<Vec<Order>, WooApiError>;
        async fn get_order(&self, order_id: &OrderId) -> Result<Order, WooApiError>;
        async fn fetch_stores(&self) -> Result<Vec<Store>, WooApiError>;
        async fn fetch_store(&self, vendor_id: &VendorId) -> Result<Store, WooApiError>;
        async fn current_user(&self) -> Result<WpUser, WooApiError>;
    }
}

pub fn order_from_json(value: Value) -> Order {
    serde_json::from_value(value).expect("test order should parse")
}

pub fn bare_order(id: &str) -> Order {
    order_from_json(json!({ "id": id, "status": "processing" }))
}

pub fn order_with_meta(id: &str, key: &str, value: Value) -> Order {
    order_from_json(json!({
        "id": id,
        "status": "processing",
        "total": "10.00",
        "meta_data": [{ "key": key, "value": value }]
    }))
}

pub fn vendor_order(id: &str, vendor: &str) -> Order {
    order_with_meta(id, "_dokan_vendor_id", json!(vendor))
}

pub fn server_error() -> WooApiError {
    WooApiError::QueryError { status: 500, message: "internal error".to_string() }
}

pub fn not_found() -> WooApiError {
    WooApiError::QueryError { status: 404, message: "rest_no_route".to_string() }
}

/// Strategy one asks the general endpoint with a vendor parameter.
pub fn is_direct_query(q: &OrderQuery) -> bool {
    q.vendor_id.is_some()
}

/// Strategy two, and the fallback of strategy three, filter on the vendor meta key.
pub fn is_meta_query(q: &OrderQuery) -> bool {
    q.vendor_id.is_none() && q.meta_key.is_some()
}

/// Strategy four fetches the newest orders unfiltered.
pub fn is_unfiltered_query(q: &OrderQuery) -> bool {
    q.vendor_id.is_none() && q.meta_key.is_none()
}
