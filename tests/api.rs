//! API endpoint integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use ember_hub::api::{hub as hub_api, health, ApiState};
use ember_hub::drivers::demo::DEMO_PIN;
use ember_hub::DemoDriver;
use tower::ServiceExt;

mod common;
use common::setup_hub;

/// Build a test API router over an in-memory hub
fn build_test_router() -> (Arc<DemoDriver>, axum::Router) {
    let (driver, manager) = setup_hub();
    let state = ApiState {
        hub: Arc::new(manager),
    };

    let router = axum::Router::new()
        .nest("/api/drivers", hub_api::drivers_router(state.clone()))
        .nest("/api/devices", hub_api::devices_router(state))
        .merge(health::router());

    (driver, router)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint() {
    let (_, app) = build_test_router();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn list_drivers_and_devices() {
    let (_, app) = build_test_router();

    let response = app.clone().oneshot(get("/api/drivers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json[0]["driver_id"], "ember-demo");
    assert_eq!(json[0]["authentication_method"], "pin");

    let response = app
        .oneshot(get("/api/drivers/ember-demo/devices"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json[0]["device_id"], "virtual-tv");
}

#[tokio::test]
async fn unknown_driver_is_404() {
    let (_, app) = build_test_router();

    let response = app
        .oneshot(get("/api/drivers/no-such-driver/devices"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("no-such-driver"));
}

#[tokio::test]
async fn pairing_flow_over_http() {
    let (driver, app) = build_test_router();

    // Start pairing
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/drivers/ember-demo/devices/virtual-tv/pairing",
            serde_json::json!({ "remote_name": "MyRemote" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = json_body(response).await;
    let request_id = json["pairing_request_id"].as_str().unwrap().to_string();
    assert_eq!(json["device_provides_pin"], true);

    // Finalize with the demo PIN
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/drivers/ember-demo/devices/virtual-tv/pairing/{request_id}"),
            serde_json::json!({ "credentials": DEMO_PIN, "device_provides_pin": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["paired"], true);
    assert_eq!(json["pairing_id"], "ember-demo.virtual-tv");

    // The pairing is visible in the device list
    let response = app.clone().oneshot(get("/api/devices")).await.unwrap();
    let json = json_body(response).await;
    assert_eq!(json[0]["pairing_id"], "ember-demo.virtual-tv");
    assert_eq!(json[0]["device_name"], "Virtual TV");

    // Commands enumerate and execute
    let response = app
        .clone()
        .oneshot(get("/api/devices/ember-demo.virtual-tv/commands"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let command_id = json[0]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!(
                    "/api/devices/ember-demo.virtual-tv/commands/{command_id}"
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(driver.executed(), vec![("virtual-tv".to_string(), command_id)]);

    // Layout and readiness
    let response = app
        .clone()
        .oneshot(get("/api/devices/ember-demo.virtual-tv/layout"))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(json["width"], 3);
    assert_eq!(json["height"], 2);

    let response = app
        .clone()
        .oneshot(get("/api/devices/ember-demo.virtual-tv/ready"))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(json["ready"], true);

    // Unpair, then the pairing ID is gone
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/devices/ember-demo.virtual-tv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get("/api/devices/ember-demo.virtual-tv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejected_pin_reports_unpaired() {
    let (_, app) = build_test_router();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/drivers/ember-demo/devices/virtual-tv/pairing",
            serde_json::json!({ "remote_name": "MyRemote" }),
        ))
        .await
        .unwrap();
    let json = json_body(response).await;
    let request_id = json["pairing_request_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/drivers/ember-demo/devices/virtual-tv/pairing/{request_id}"),
            serde_json::json!({ "credentials": "0000", "device_provides_pin": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["paired"], false);
    assert!(json.get("pairing_id").is_none());

    let response = app.oneshot(get("/api/devices")).await.unwrap();
    let json = json_body(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn stale_pairing_request_is_bad_request() {
    let (_, app) = build_test_router();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/drivers/ember-demo/devices/virtual-tv/pairing/never-issued",
            serde_json::json!({ "credentials": DEMO_PIN, "device_provides_pin": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn command_on_unknown_pairing_is_404() {
    let (_, app) = build_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/devices/unknown.pid/commands/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
