use std::time::Duration;

use radio_thermostat::{
    CurrentState, DeviceClient, DeviceMode, Error, FanMode, StateCache, TstatState,
};
use reqwest::Method;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tstat_body(temp: f64) -> serde_json::Value {
    json!({
        "temp": temp,
        "tmode": 1,
        "fmode": 0,
        "override": 0,
        "hold": 0,
        "t_heat": 68.0,
        "tstate": 1,
        "fstate": 1,
        "time": { "day": 3, "hour": 7, "minute": 12 },
        "t_type_post": 0
    })
}

#[tokio::test]
async fn get_decodes_tstat_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tstat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tstat_body(71.5)))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeviceClient::new(&server.uri()).unwrap();
    let state: TstatState = client.get("/tstat").await.unwrap();

    assert_eq!(state.temp, 71.5);
    assert_eq!(state.tmode, DeviceMode::Heat);
    assert_eq!(state.tstate, CurrentState::Heat);
    assert_eq!(state.t_heat, Some(68.0));
    assert_eq!(state.t_cool, None);
    assert_eq!(state.fmode, Some(FanMode::Auto));
    assert!(state.fan_active());
}

#[tokio::test]
async fn post_sends_raw_json_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tstat"))
        .and(body_json(json!({"t_cool": 76})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeviceClient::new(&server.uri()).unwrap();
    let reply = client
        .request(Method::POST, "/tstat", Some(r#"{"t_cool":76}"#.to_string()))
        .await
        .unwrap();
    assert_eq!(reply["success"], 0);
}

#[tokio::test]
async fn non_success_status_is_communication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tstat"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = DeviceClient::new(&server.uri()).unwrap();
    let err = client.get::<TstatState>("/tstat").await.unwrap_err();

    match err {
        Error::Communication { url, status, .. } => {
            assert_eq!(url, format!("{}/tstat", server.uri()));
            assert_eq!(status, Some(503));
        }
        other => panic!("expected communication failure, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_communication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tstat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let client = DeviceClient::new(&server.uri()).unwrap();
    let err = client.get::<TstatState>("/tstat").await.unwrap_err();
    assert!(err.is_communication());
    assert_eq!(err.status(), Some(200));
}

#[tokio::test]
async fn unknown_mode_code_is_communication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tstat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"temp": 70.0, "tmode": 9})))
        .mount(&server)
        .await;

    let client = DeviceClient::new(&server.uri()).unwrap();
    let err = client.get::<TstatState>("/tstat").await.unwrap_err();
    assert!(err.is_communication());
}

#[tokio::test]
async fn unreachable_device_has_no_status() {
    let client = DeviceClient::new("http://127.0.0.1:9").unwrap();
    let err = client.get::<TstatState>("/tstat").await.unwrap_err();
    assert!(err.is_communication());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn failed_refresh_keeps_cached_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tstat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tstat_body(70.0)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tstat"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tstat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tstat_body(73.0)))
        .mount(&server)
        .await;

    let client = DeviceClient::new(&server.uri()).unwrap();
    let cache = StateCache::new(Duration::from_millis(50));

    let first = cache.get_or_refresh(|| client.get::<TstatState>("/tstat")).await.unwrap();
    assert_eq!(first.temp, 70.0);
    let first_at = cache.fetched_at().await.unwrap();

    tokio::time::sleep(Duration::from_millis(80)).await;
    let err = cache
        .get_or_refresh(|| client.get::<TstatState>("/tstat"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(cache.peek().await.unwrap().temp, 70.0);
    assert_eq!(cache.fetched_at().await.unwrap(), first_at);

    let third = cache.get_or_refresh(|| client.get::<TstatState>("/tstat")).await.unwrap();
    assert_eq!(third.temp, 73.0);
    assert_eq!(cache.peek().await.unwrap().temp, 73.0);
}
