use std::sync::Arc;

use dpa_common::{helpers::join_url, OrderId, VendorId};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::WooConfig,
    data_objects::{OrderQuery, Store, WpUser},
    helpers::basic_auth_value,
    Order,
    OrderStatus,
    WooApiError,
};

pub const ORDERS_PATH: &str = "/wp-json/wc/v3/orders";
pub const DOKAN_ORDERS_PATH: &str = "/wp-json/dokan/v1/orders";
pub const DOKAN_STORES_PATH: &str = "/wp-json/dokan/v1/stores";
pub const USERS_ME_PATH: &str = "/wp-json/wp/v2/users/me";

#[derive(Clone)]
pub struct WooApi {
    config: WooConfig,
    client: Arc<Client>,
}

impl WooApi {
    pub fn new(config: WooConfig) -> Result<Self, WooApiError> {
        config.validate()?;
        let mut headers = HeaderMap::with_capacity(2);
        let mut auth = HeaderValue::from_str(&basic_auth_value(&config.username, &config.password))
            .map_err(|e| WooApiError::Initialization(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| WooApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &WooConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.config.api_url, path)
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
        body: Option<B>,
    ) -> Result<T, WooApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url} {params:?}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| WooApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await?;
            Err(WooApiError::QueryError { status, message })
        }
    }

    pub async fn fetch_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, WooApiError> {
        let params = query.to_params();
        let orders = self.rest_query::<Vec<Order>, ()>(Method::GET, ORDERS_PATH, &params, None).await?;
        debug!("Fetched {} orders with {params:?}", orders.len());
        Ok(orders)
    }

    pub async fn get_order(&self, order_id: &OrderId) -> Result<Order, WooApiError> {
        let path = format!("{ORDERS_PATH}/{}", order_id.as_str());
        debug!("Fetching order {order_id}");
        let order = self.rest_query::<Order, ()>(Method::GET, &path, &[], None).await?;
        info!("Fetched order {order_id}");
        Ok(order)
    }

    /// Queries Dokan's own order endpoint, which scopes results to a seller.
    pub async fn fetch_dokan_orders(
        &self,
        vendor_id: &VendorId,
        status: OrderStatus,
        per_page: u32,
    ) -> Result<Vec<Order>, WooApiError> {
        let params = vec![
            ("status".to_string(), status.as_str().to_string()),
            ("per_page".to_string(), per_page.to_string()),
            ("seller_id".to_string(), vendor_id.to_string()),
        ];
        let orders = self.rest_query::<Vec<Order>, ()>(Method::GET, DOKAN_ORDERS_PATH, &params, None).await?;
        debug!("Fetched {} orders from the vendor endpoint for vendor {vendor_id}", orders.len());
        Ok(orders)
    }

    pub async fn fetch_stores(&self) -> Result<Vec<Store>, WooApiError> {
        let params = vec![("per_page".to_string(), "100".to_string())];
        let stores = self.rest_query::<Vec<Store>, ()>(Method::GET, DOKAN_STORES_PATH, &params, None).await?;
        debug!("Fetched {} vendor stores", stores.len());
        Ok(stores)
    }

    pub async fn fetch_store(&self, id: &VendorId) -> Result<Store, WooApiError> {
        let path = format!("{DOKAN_STORES_PATH}/{id}");
        self.rest_query::<Store, ()>(Method::GET, &path, &[], None).await
    }

    pub async fn current_user(&self) -> Result<WpUser, WooApiError> {
        let user = self.rest_query::<WpUser, ()>(Method::GET, USERS_ME_PATH, &[], None).await?;
        debug!("Authenticated as user {} ({})", user.id, user.name);
        Ok(user)
    }

    /// A cheap authenticated call to check that the store is reachable and accepts the credentials.
    pub async fn test_connection(&self) -> Result<(), WooApiError> {
        let query = OrderQuery { per_page: Some(1), ..Default::default() };
        self.fetch_orders(&query).await.map(|_| ())
    }
}
