use dpa_common::VendorId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::OrderStatus;

/// A vendor store record from `GET /wp-json/dokan/v1/stores`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub store_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl Store {
    pub fn vendor_id(&self) -> Option<VendorId> {
        VendorId::from_value(&self.id)
    }
}

/// The authenticated WordPress user, from `GET /wp-json/wp/v2/users/me`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WpUser {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl WpUser {
    pub fn user_id(&self) -> Option<VendorId> {
        VendorId::from_value(&self.id)
    }
}

/// Query parameters for the order listing endpoint. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub per_page: Option<u32>,
    pub vendor_id: Option<VendorId>,
    pub meta_key: Option<String>,
    pub meta_value: Option<String>,
    pub orderby: Option<String>,
    pub order: Option<String>,
}

impl OrderQuery {
    pub fn processing(per_page: u32) -> Self {
        Self { status: Some(OrderStatus::Processing), per_page: Some(per_page), ..Default::default() }
    }

    pub fn newest_first(mut self) -> Self {
        self.orderby = Some("date".to_string());
        self.order = Some("desc".to_string());
        self
    }

    pub fn with_vendor(mut self, vendor_id: &VendorId) -> Self {
        self.vendor_id = Some(vendor_id.clone());
        self
    }

    pub fn with_meta(mut self, key: &str, value: &str) -> Self {
        self.meta_key = Some(key.to_string());
        self.meta_value = Some(value.to_string());
        self
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![];
        if let Some(status) = &self.status {
            params.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(per_page) = self.per_page {
            params.push(("per_page".to_string(), per_page.to_string()));
        }
        if let Some(vendor_id) = &self.vendor_id {
            params.push(("vendor_id".to_string(), vendor_id.to_string()));
        }
        if let Some(key) = &self.meta_key {
            params.push(("meta_key".to_string(), key.clone()));
        }
        if let Some(value) = &self.meta_value {
            params.push(("meta_value".to_string(), value.clone()));
        }
        if let Some(orderby) = &self.orderby {
            params.push(("orderby".to_string(), orderby.clone()));
        }
        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.clone()));
        }
        params
    }
}
