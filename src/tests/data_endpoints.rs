use std::time::Duration;

use chrono::{TimeZone, Utc};
use http::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::client::FuelFinderClient;
use crate::error::{Error, STATUS_TIMEOUT};
use crate::helpers::time::{INVALID_DATE_MESSAGE, INVALID_FORMAT_MESSAGE};
use crate::helpers::time::SinceTime;
use crate::tests::common::*;
use crate::utils::constants::{FUEL_PRICES_PATH, PFS_INFO_INCREMENTAL_PATH, PFS_INFO_PATH};

fn price_records() -> Value {
    json!([{
        "node_id": "a1b2c3",
        "trading_name": "HIGH STREET SERVICE STATION",
        "fuel_prices": [
            { "fuel_type": "E10", "price": 134.9, "price_last_updated": "2025-09-05T09:12:00Z" },
            { "fuel_type": "B7", "price": "141.9" }
        ],
        "is_motorway_service_station": false
    }])
}

#[tokio::test]
async fn all_fuel_prices_sends_bearer_token_and_decodes_envelope() {
    let server = MockServer::start_async().await;
    let generate = mock_generate(&server, "access-1", "refresh-1", 3600).await;
    let prices = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(FUEL_PRICES_PATH)
                .header("authorization", "Bearer access-1")
                .header("content-type", "application/json");
            then.status(200).json_body(envelope(price_records()));
        })
        .await;
    let client = client_for(&server);

    let response = client.get_all_pfs_fuel_prices().await.expect("prices");
    client.get_all_pfs_fuel_prices().await.expect("prices");

    assert!(response.success);
    assert!(response.data.success);
    let stations = response.records();
    assert_eq!(stations.len(), 1);
    assert_eq!(stations[0].node_id.as_deref(), Some("a1b2c3"));
    let fuel_prices = stations[0].fuel_prices.as_ref().expect("fuel prices");
    assert_eq!(fuel_prices[0].fuel_type.as_deref(), Some("E10"));
    assert_eq!(fuel_prices[1].price, Some(json!("141.9")));
    assert_eq!(stations[0].extra.get("is_motorway_service_station"), Some(&json!(false)));

    assert_eq!(generate.calls_async().await, 1);
    assert_eq!(prices.calls_async().await, 2);
}

#[tokio::test]
async fn pfs_info_uses_trailing_slash_and_incremental_does_not() {
    let server = MockServer::start_async().await;
    mock_generate(&server, "access-1", "refresh-1", 3600).await;
    let full = server
        .mock_async(|when, then| {
            when.method(GET).path(PFS_INFO_PATH);
            then.status(200).json_body(envelope(json!([{ "node_id": "n1", "brand_name": "BRAND" }])));
        })
        .await;
    let incremental = server
        .mock_async(|when, then| {
            when.method(GET).path(PFS_INFO_INCREMENTAL_PATH).query_param_exists("date_time");
            then.status(200).json_body(envelope(json!([])));
        })
        .await;
    let client = client_for(&server);

    let info = client.get_pfs_info().await.expect("info");
    assert_eq!(info.records()[0].brand_name.as_deref(), Some("BRAND"));

    let changed = client.get_incremental_pfs_info("2025-09-05 10:00:00").await.expect("info");
    assert!(changed.records().is_empty());

    assert_eq!(full.calls_async().await, 1);
    assert_eq!(incremental.calls_async().await, 1);
}

#[tokio::test]
async fn incremental_requests_carry_the_normalized_timestamp() {
    let transport = ScriptedTransport::default();
    transport
        .push_json(200, token_body("access-1", "refresh-1", 3600))
        .push_json(200, envelope(json!([])))
        .push_json(200, envelope(json!([])));
    let client = scripted_client(&transport, "https://registry.test/");

    client
        .get_incremental_pfs_fuel_prices("2025-09-05 10:00:00")
        .await
        .expect("prices");
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    client.get_incremental_pfs_info(at).await.expect("info");

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(
        requests[1].url,
        "https://registry.test/api/v1/pfs/fuel-prices?date_time=2025-09-05+10%3A00%3A00"
    );
    assert_eq!(
        requests[2].url,
        "https://registry.test/api/v1/pfs?date_time=2025-01-02+03%3A04%3A05"
    );
    assert_eq!(requests[1].headers.get(AUTHORIZATION).unwrap(), "Bearer access-1");
    assert_eq!(requests[1].headers.get(CONTENT_TYPE).unwrap(), "application/json");
    assert!(requests[1].body.is_none());
}

#[tokio::test]
async fn invalid_since_time_is_rejected_before_any_request() {
    let transport = ScriptedTransport::default();
    let client = scripted_client(&transport, "https://registry.test");

    let err = client
        .get_incremental_pfs_fuel_prices("2025-09-05")
        .await
        .expect_err("date-only string");
    assert!(matches!(&err, Error::InvalidInput(message) if message == INVALID_FORMAT_MESSAGE));

    let err = client
        .get_incremental_pfs_info(SinceTime::UnixMillis(i64::MAX))
        .await
        .expect_err("out of range instant");
    assert!(matches!(&err, Error::InvalidInput(message) if message == INVALID_DATE_MESSAGE));
    assert!(err.api().is_none());

    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn invalid_credentials_surface_the_real_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(crate::utils::constants::GENERATE_TOKEN_PATH);
            then.status(401).json_body(json!({ "success": false, "message": "Unauthorized" }));
        })
        .await;
    let prices = server
        .mock_async(|when, then| {
            when.method(GET).path(FUEL_PRICES_PATH);
            then.status(200).json_body(envelope(json!([])));
        })
        .await;
    let client = FuelFinderClient::new(
        crate::client::Credentials::new("wrong", "creds"),
        options_for(&server, None),
    )
    .expect("client");

    let err = client.get_all_pfs_fuel_prices().await.expect_err("must fail");
    let api = err.api().expect("api error");
    assert_eq!(api.status, 401);
    assert_eq!(api.message, "Unauthorized");
    assert_eq!(prices.calls_async().await, 0);
}

#[tokio::test]
async fn data_endpoint_errors_keep_status_and_body() {
    let server = MockServer::start_async().await;
    mock_generate(&server, "access-1", "refresh-1", 3600).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(PFS_INFO_PATH);
            then.status(503).body("upstream unavailable");
        })
        .await;
    let client = client_for(&server);

    let err = client.get_pfs_info().await.expect_err("must fail");
    let api = err.api().expect("api error");
    assert_eq!(api.status, 503);
    assert_eq!(api.details, Some(json!("upstream unavailable")));
}

#[tokio::test]
async fn get_timeout_uses_plain_message() {
    let server = MockServer::start_async().await;
    mock_generate(&server, "access-1", "refresh-1", 3600).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(FUEL_PRICES_PATH);
            then.status(200)
                .delay(Duration::from_millis(1500))
                .json_body(envelope(json!([])));
        })
        .await;
    let client = FuelFinderClient::new(credentials(), options_for(&server, Some(300))).expect("client");

    let err = client.get_all_pfs_fuel_prices().await.expect_err("must time out");
    let api = err.api().expect("api error");
    assert_eq!(api.status, STATUS_TIMEOUT);
    assert_eq!(api.message, "Request timed out.");
}

#[tokio::test]
async fn envelope_without_inner_array_is_a_decode_failure() {
    let transport = ScriptedTransport::default();
    transport
        .push_json(200, token_body("access-1", "refresh-1", 3600))
        .push_json(200, json!({ "success": true, "data": { "success": true, "data": "not-a-list" } }));
    let client = scripted_client(&transport, "https://registry.test");

    let err = client.get_all_pfs_fuel_prices().await.expect_err("must fail");
    let api = err.api().expect("api error");
    assert_eq!(api.status, 0);
    assert!(api.details.is_some());
}
