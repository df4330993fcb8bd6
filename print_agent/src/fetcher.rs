//! Retrieval of a vendor's processing orders.
//!
//! Vendor filtering is unevenly supported by store configurations: some honour a `vendor_id` parameter, some a meta
//! query, some only expose Dokan's own endpoint, and some ignore all of these silently. The fetcher therefore tries a
//! fixed list of [`FetchStrategy`]s, cheapest first, and stops at the first one that returns orders. The last strategy
//! fetches recent orders unfiltered and filters them locally, so it is always correct, just more expensive.
//!
//! A strategy succeeding says nothing about ownership. Callers must still run the results through
//! [`crate::ownership`] before trusting them.
use std::fmt::Display;

use dpa_common::VendorId;
use log::*;
use woo_tools::{Order, OrderQuery, WooApiError};

use crate::{errors::AgentError, ownership::filter_by_vendor, traits::DokanApi};

/// Page size for the vendor-scoped strategies. There is no paging beyond the first page.
pub const PAGE_SIZE: u32 = 20;
/// How many of the newest orders the fetch-all strategy inspects.
pub const FETCH_ALL_LIMIT: u32 = 50;
/// The meta key used for server-side meta filtering.
pub const VENDOR_META_KEY: &str = "_dokan_vendor_id";

pub type StrategyResult = Result<Vec<Order>, WooApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// `status=processing&vendor_id=<id>` on the general orders endpoint.
    DirectParameter,
    /// `meta_key=_dokan_vendor_id&meta_value=<id>` on the general orders endpoint.
    MetaFilter,
    /// The marketplace's own vendor orders endpoint, falling back to the meta filter if that endpoint fails.
    VendorEndpoint,
    /// The newest processing orders, unfiltered, checked locally.
    FetchAllAndFilter,
}

pub const FETCH_STRATEGIES: [FetchStrategy; 4] = [
    FetchStrategy::DirectParameter,
    FetchStrategy::MetaFilter,
    FetchStrategy::VendorEndpoint,
    FetchStrategy::FetchAllAndFilter,
];

impl Display for FetchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FetchStrategy::DirectParameter => "direct vendor parameter",
            FetchStrategy::MetaFilter => "vendor meta filter",
            FetchStrategy::VendorEndpoint => "vendor orders endpoint",
            FetchStrategy::FetchAllAndFilter => "fetch all and filter",
        };
        f.write_str(name)
    }
}

impl FetchStrategy {
    pub async fn run<A: DokanApi + ?Sized>(self, api: &A, vendor_id: &VendorId) -> StrategyResult {
        match self {
            FetchStrategy::DirectParameter => {
                let query = OrderQuery::processing(PAGE_SIZE).with_vendor(vendor_id);
                api.fetch_orders(&query).await
            },
            FetchStrategy::MetaFilter => meta_filter_query(api, vendor_id).await,
            FetchStrategy::VendorEndpoint => match api.fetch_vendor_endpoint_orders(vendor_id, PAGE_SIZE).await {
                Ok(orders) => Ok(orders),
                Err(e) => {
                    debug!("🛒 Vendor orders endpoint unavailable ({e}). Falling back to the meta filter.");
                    meta_filter_query(api, vendor_id).await
                },
            },
            FetchStrategy::FetchAllAndFilter => {
                let query = OrderQuery::processing(FETCH_ALL_LIMIT).newest_first();
                let orders = api.fetch_orders(&query).await?;
                Ok(filter_by_vendor(orders, vendor_id))
            },
        }
    }
}

async fn meta_filter_query<A: DokanApi + ?Sized>(api: &A, vendor_id: &VendorId) -> StrategyResult {
    let query = OrderQuery::processing(PAGE_SIZE).with_meta(VENDOR_META_KEY, vendor_id.as_str());
    api.fetch_orders(&query).await
}

/// Fetches the vendor's processing orders using [`FETCH_STRATEGIES`].
pub async fn fetch_vendor_orders<A: DokanApi + ?Sized>(api: &A, vendor_id: &VendorId) -> Result<Vec<Order>, AgentError> {
    fetch_with_strategies(api, vendor_id, &FETCH_STRATEGIES).await
}

/// Runs `strategies` in order and returns the first non-empty result.
///
/// An empty result from a strategy that ran without error is remembered, so if nothing turns up orders the fetch is a
/// successful, empty one. Only when every strategy failed is a [`AgentError::FetchError`] returned.
pub async fn fetch_with_strategies<A: DokanApi + ?Sized>(
    api: &A,
    vendor_id: &VendorId,
    strategies: &[FetchStrategy],
) -> Result<Vec<Order>, AgentError> {
    if vendor_id.is_empty() {
        return Err(AgentError::ConfigurationError("A vendor id is required to fetch orders".to_string()));
    }
    let mut any_succeeded = false;
    let mut failures = vec![];
    for strategy in strategies {
        match strategy.run(api, vendor_id).await {
            Ok(orders) if !orders.is_empty() => {
                info!("🛒 Fetched {} orders for vendor {vendor_id} using the {strategy}", orders.len());
                return Ok(orders);
            },
            Ok(_) => {
                debug!("🛒 The {strategy} returned no orders for vendor {vendor_id}");
                any_succeeded = true;
            },
            Err(e) => {
                warn!("🛒 The {strategy} failed for vendor {vendor_id}. {e}");
                failures.push(format!("{strategy}: {e}"));
            },
        }
    }
    if any_succeeded || strategies.is_empty() {
        debug!("🛒 No new orders for vendor {vendor_id}");
        Ok(vec![])
    } else {
        Err(AgentError::FetchError(failures.join("; ")))
    }
}
