use dpa_common::OrderId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An order as returned by `GET /wp-json/wc/v3/orders`.
///
/// Only the fields the agent uses are typed. Everything else the server sends lands in `extra`, which matters because
/// some marketplace plugins put the vendor id directly on the order (`store_id`, `seller_id`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub shipping_total: Option<String>,
    #[serde(default)]
    pub customer_note: Option<String>,
    #[serde(default)]
    pub payment_method_title: Option<String>,
    #[serde(default)]
    pub billing: Billing,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub meta_data: Vec<MetaData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// The order number customers see, falling back to the id.
    pub fn display_number(&self) -> &str {
        self.number.as_deref().filter(|n| !n.is_empty()).unwrap_or(self.id.as_str())
    }

    /// Returns the first meta value stored under `key`.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.meta_data.iter().find(|m| m.key == key).map(|m| &m.value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    #[default]
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    Trash,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Failed => "failed",
            OrderStatus::Trash => "trash",
            OrderStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Billing {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub address_2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: String,
}

impl Billing {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<Value>,
    #[serde(default)]
    pub meta_data: Vec<MetaData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

impl MetaData {
    pub fn new<K: Into<String>>(key: K, value: Value) -> Self {
        Self { id: None, key: key.into(), value }
    }
}
