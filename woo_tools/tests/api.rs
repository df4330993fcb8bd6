use std::time::Duration;

use dpa_common::{OrderId, VendorId};
use serde_json::json;
use woo_tools::{OrderQuery, OrderStatus, WooApi, WooApiError, WooConfig};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock,
    MockServer,
    ResponseTemplate,
};

fn api_for(server: &MockServer) -> WooApi {
    let _ = env_logger::try_init();
    let config = WooConfig::new(&format!("{}/", server.uri()), "shop", "pa55");
    WooApi::new(config).expect("client should build")
}

#[tokio::test]
async fn orders_are_fetched_with_basic_auth_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/orders"))
        .and(header("Authorization", "Basic c2hvcDpwYTU1"))
        .and(query_param("status", "processing"))
        .and(query_param("per_page", "20"))
        .and(query_param("vendor_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 100, "status": "processing", "meta_data": [{ "key": "_dokan_vendor_id", "value": "7" }] }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    let api = api_for(&server);
    let orders = api.fetch_orders(&OrderQuery::processing(20).with_vendor(&VendorId::from("7"))).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, OrderId::from("100"));
}

#[tokio::test]
async fn error_statuses_become_query_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/dokan/v1/orders"))
        .respond_with(ResponseTemplate::new(404).set_body_string("rest_no_route"))
        .mount(&server)
        .await;
    let api = api_for(&server);
    let err = api.fetch_dokan_orders(&VendorId::from("7"), OrderStatus::Processing, 20).await.unwrap_err();
    assert!(err.is_not_found());
    match err {
        WooApiError::QueryError { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "rest_no_route");
        },
        e => panic!("Unexpected error {e}"),
    }
}

#[tokio::test]
async fn vendor_endpoint_sends_seller_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/dokan/v1/orders"))
        .and(query_param("seller_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }, { "id": "2" }])))
        .mount(&server)
        .await;
    let api = api_for(&server);
    let orders = api.fetch_dokan_orders(&VendorId::from("7"), OrderStatus::Processing, 20).await.unwrap();
    assert_eq!(orders.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(), vec!["1", "2"]);
}

#[tokio::test]
async fn single_order_stores_and_current_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/orders/55"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 55, "status": "on-hold" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/dokan/v1/stores"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 7, "store_name": "Pizza Place", "email": "pizza@shop.test" }])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3, "name": "shop" })))
        .mount(&server)
        .await;
    let api = api_for(&server);
    let order = api.get_order(&OrderId::from("55")).await.unwrap();
    assert_eq!(order.status, OrderStatus::OnHold);
    let stores = api.fetch_stores().await.unwrap();
    assert_eq!(stores[0].vendor_id(), Some(VendorId::from("7")));
    let me = api.current_user().await.unwrap();
    assert_eq!(me.user_id(), Some(VendorId::from("3")));
}

#[tokio::test]
async fn malformed_bodies_are_json_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    let api = api_for(&server);
    let err = api.test_connection().await.unwrap_err();
    assert!(matches!(err, WooApiError::JsonError(_)), "{err}");
}

#[tokio::test]
async fn slow_servers_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    let config = WooConfig::new(&server.uri(), "shop", "pa55").with_timeout(Duration::from_millis(200));
    let api = WooApi::new(config).unwrap();
    let err = api.test_connection().await.unwrap_err();
    assert!(matches!(err, WooApiError::Timeout(_)), "{err}");
}

#[test]
fn missing_credentials_are_rejected_before_any_request() {
    let err = WooApi::new(WooConfig::new("https://shop.test", "", "pw")).err().unwrap();
    assert!(matches!(err, WooApiError::Initialization(_)));
}
