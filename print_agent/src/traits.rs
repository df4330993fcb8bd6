use async_trait::async_trait;
use dpa_common::{OrderId, VendorId};
use woo_tools::{Order, OrderQuery, OrderStatus, Store, WooApi, WooApiError, WpUser};

/// The store calls the agent relies on. [`WooApi`] is the production implementation; tests substitute a mock.
#[async_trait]
pub trait DokanApi: Send + Sync {
    /// Lists orders from the general WooCommerce endpoint.
    async fn fetch_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, WooApiError>;

    /// Lists processing orders from the vendor-scoped marketplace endpoint.
    async fn fetch_vendor_endpoint_orders(&self, vendor_id: &VendorId, per_page: u32)
        -> Result<Vec<Order>, WooApiError>;

    async fn get_order(&self, order_id: &OrderId) -> Result<Order, WooApiError>;

    async fn fetch_stores(&self) -> Result<Vec<Store>, WooApiError>;

    async fn fetch_store(&self, vendor_id: &VendorId) -> Result<Store, WooApiError>;

    async fn current_user(&self) -> Result<WpUser, WooApiError>;
}

#[async_trait]
impl DokanApi for WooApi {
    async fn fetch_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, WooApiError> {
        WooApi::fetch_orders(self, query).await
    }

    async fn fetch_vendor_endpoint_orders(
        &self,
        vendor_id: &VendorId,
        per_page: u32,
    ) -> Result<Vec<Order>, WooApiError> {
        self.fetch_dokan_orders(vendor_id, OrderStatus::Processing, per_page).await
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<Order, WooApiError> {
        WooApi::get_order(self, order_id).await
    }

    async fn fetch_stores(&self) -> Result<Vec<Store>, WooApiError> {
        WooApi::fetch_stores(self).await
    }

    async fn fetch_store(&self, vendor_id: &VendorId) -> Result<Store, WooApiError> {
        WooApi::fetch_store(self, vendor_id).await
    }

    async fn current_user(&self) -> Result<WpUser, WooApiError> {
        WooApi::current_user(self).await
    }
}
