//! # WooCommerce / Dokan REST client
//!
//! A thin, typed wrapper over the parts of the WooCommerce (`wc/v3`), Dokan (`dokan/v1`) and WordPress (`wp/v2`) REST
//! APIs that the print agent needs: listing and fetching orders, listing vendor stores, and identifying the
//! authenticated user. Every request carries HTTP Basic credentials and a bounded timeout.
mod api;
mod config;
mod data_objects;
mod error;
mod helpers;
mod woo_order;

pub use api::{WooApi, DOKAN_ORDERS_PATH, DOKAN_STORES_PATH, ORDERS_PATH, USERS_ME_PATH};
pub use config::WooConfig;
pub use data_objects::{OrderQuery, Store, WpUser};
pub use error::WooApiError;
pub use helpers::basic_auth_value;
pub use woo_order::{Billing, LineItem, MetaData, Order, OrderStatus};
