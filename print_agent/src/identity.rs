//! Works out the vendor id from the store credentials when none is configured.
use std::collections::BTreeSet;

use dpa_common::VendorId;
use log::*;
use woo_tools::{OrderQuery, Store};

use crate::{ownership::ORDER_META_VENDOR_KEYS, traits::DokanApi};

/// How many recent orders are sampled when looking for vendor ids in order metadata.
pub const ORDER_SAMPLE_SIZE: u32 = 20;

/// Tries, in order, to match the username against the marketplace's store list, to find the store owned by the
/// authenticated user, and to find a single vendor id in recent order metadata. Returns an empty [`VendorId`] if none
/// of these yields a confident answer. Never fails.
pub async fn resolve_vendor_id<A: DokanApi + ?Sized>(api: &A, username: &str) -> VendorId {
    info!("🔎 Trying to detect the vendor id for '{username}'");
    if let Some(id) = match_store_by_username(api, username).await {
        info!("🔎 Vendor {id} matched from the store list");
        return id;
    }
    if let Some(id) = vendor_from_current_user(api).await {
        info!("🔎 Vendor {id} derived from the authenticated user");
        return id;
    }
    if let Some(id) = vendor_from_recent_orders(api).await {
        info!("🔎 Vendor {id} found in recent order metadata");
        return id;
    }
    warn!("🔎 Could not detect a vendor id for '{username}'. Please configure DPA_VENDOR_ID.");
    VendorId::default()
}

async fn match_store_by_username<A: DokanApi + ?Sized>(api: &A, username: &str) -> Option<VendorId> {
    let stores = api
        .fetch_stores()
        .await
        .map_err(|e| debug!("🔎 Could not list vendor stores. {e}"))
        .ok()?;
    match_store(&stores, username)
}

/// Matches `username` against store emails (exact, then substring) and finally against store names (substring).
/// Comparisons ignore case.
pub fn match_store(stores: &[Store], username: &str) -> Option<VendorId> {
    let needle = username.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let email_of = |s: &Store| s.email.as_deref().map(str::to_lowercase);
    stores
        .iter()
        .find(|s| email_of(s).is_some_and(|e| e == needle))
        .or_else(|| stores.iter().find(|s| email_of(s).is_some_and(|e| e.contains(&needle))))
        .or_else(|| stores.iter().find(|s| s.store_name.to_lowercase().contains(&needle)))
        .and_then(Store::vendor_id)
}

async fn vendor_from_current_user<A: DokanApi + ?Sized>(api: &A) -> Option<VendorId> {
    let user = api
        .current_user()
        .await
        .map_err(|e| debug!("🔎 Could not look up the authenticated user. {e}"))
        .ok()?;
    let user_id = user.user_id()?;
    match api.fetch_store(&user_id).await {
        Ok(store) => match store.vendor_id() {
            Some(id) => Some(id),
            None => {
                warn!("🔎 The store record for user {user_id} has no id. Using the user id as the vendor id.");
                Some(user_id)
            },
        },
        Err(e) => {
            warn!("🔎 User {user_id} does not appear to own a store ({e}). Using the user id as the vendor id.");
            Some(user_id)
        },
    }
}

async fn vendor_from_recent_orders<A: DokanApi + ?Sized>(api: &A) -> Option<VendorId> {
    let query = OrderQuery { per_page: Some(ORDER_SAMPLE_SIZE), ..Default::default() }.newest_first();
    let orders = api
        .fetch_orders(&query)
        .await
        .map_err(|e| debug!("🔎 Could not sample recent orders. {e}"))
        .ok()?;
    let found = orders
        .iter()
        .flat_map(|o| o.meta_data.iter())
        .filter(|m| ORDER_META_VENDOR_KEYS.contains(&m.key.as_str()))
        .filter_map(|m| VendorId::from_value(&m.value))
        .collect::<BTreeSet<VendorId>>();
    match found.len() {
        1 => found.into_iter().next(),
        0 => None,
        n => {
            let ids = found.iter().map(VendorId::to_string).collect::<Vec<String>>().join(", ");
            warn!("🔎 Found {n} different vendor ids in recent orders ({ids}). Not guessing.");
            None
        },
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use woo_tools::WpUser;

    use super::*;
    use crate::test_utils::{not_found, server_error, vendor_order, MockDokan};

    fn store(id: u64, name: &str, email: &str) -> Store {
        Store { id: json!(id), store_name: name.to_string(), email: Some(email.to_string()), ..Default::default() }
    }

    #[test]
    fn store_matching_precedence() {
        let stores = vec![
            store(1, "Shop Supplies", "owner@other.test"),
            store(2, "Pizza", "shop.orders@pizza.test"),
            store(3, "Bakery", "SHOP@bakery.test"),
        ];
        assert_eq!(match_store(&stores, "shop@bakery.test"), Some(VendorId::from("3")));
        assert_eq!(match_store(&stores, "shop.orders"), Some(VendorId::from("2")));
        assert_eq!(match_store(&stores, "supplies"), Some(VendorId::from("1")));
        assert_eq!(match_store(&stores, "nobody"), None);
        assert_eq!(match_store(&stores, "  "), None);
    }

    #[tokio::test]
    async fn store_list_match_wins() {
        let _ = env_logger::try_init();
        let mut api = MockDokan::new();
        api.expect_fetch_stores().times(1).returning(|| Ok(vec![store(12, "Pizza", "pizza@market.test")]));
        api.expect_current_user().never();
        assert_eq!(resolve_vendor_id(&api, "Pizza@Market.test").await, VendorId::from("12"));
    }

    #[tokio::test]
    async fn falls_back_to_the_users_own_store() {
        let _ = env_logger::try_init();
        let mut api = MockDokan::new();
        api.expect_fetch_stores().returning(|| Err(not_found()));
        api.expect_current_user().returning(|| Ok(WpUser { id: json!(5), name: "shop".into(), ..Default::default() }));
        api.expect_fetch_store()
            .withf(|id| id.as_str() == "5")
            .returning(|_| Ok(store(5, "Shop", "shop@market.test")));
        assert_eq!(resolve_vendor_id(&api, "shop").await, VendorId::from("5"));
    }

    #[tokio::test]
    async fn user_id_is_a_best_effort_vendor_id() {
        let _ = env_logger::try_init();
        let mut api = MockDokan::new();
        api.expect_fetch_stores().returning(|| Ok(vec![]));
        api.expect_current_user().returning(|| Ok(WpUser { id: json!("8"), ..Default::default() }));
        api.expect_fetch_store().returning(|_| Err(not_found()));
        api.expect_fetch_orders().never();
        assert_eq!(resolve_vendor_id(&api, "shop").await, VendorId::from("8"));
    }

    #[tokio::test]
    async fn single_vendor_in_recent_orders() {
        let _ = env_logger::try_init();
        let mut api = MockDokan::new();
        api.expect_fetch_stores().returning(|| Err(server_error()));
        api.expect_current_user().returning(|| Err(server_error()));
        api.expect_fetch_orders()
            .withf(|q| q.per_page == Some(ORDER_SAMPLE_SIZE) && q.status.is_none())
            .returning(|_| Ok(vec![vendor_order("1", "4"), vendor_order("2", "4")]));
        assert_eq!(resolve_vendor_id(&api, "shop").await, VendorId::from("4"));
    }

    #[tokio::test]
    async fn ambiguous_or_total_failure_yields_empty() {
        let _ = env_logger::try_init();
        let mut api = MockDokan::new();
        api.expect_fetch_stores().returning(|| Err(server_error()));
        api.expect_current_user().returning(|| Err(server_error()));
        api.expect_fetch_orders().returning(|_| Ok(vec![vendor_order("1", "4"), vendor_order("2", "6")]));
        assert!(resolve_vendor_id(&api, "shop").await.is_empty());

        let mut api = MockDokan::new();
        api.expect_fetch_stores().returning(|| Err(server_error()));
        api.expect_current_user().returning(|| Err(server_error()));
        api.expect_fetch_orders().returning(|_| Err(server_error()));
        assert!(resolve_vendor_id(&api, "shop").await.is_empty());
    }
}
