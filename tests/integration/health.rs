//! Liveness and readiness endpoint tests

use reqwest::StatusCode;
use serde_json::Value;

use crate::helpers::{
    assert_header_starts_with, assert_status, refused_port, MockIcap, TestExporter, OPTIONS_OK,
    STATS_PAGE,
};

const OPTIONS_FORBIDDEN: &[u8] = b"ICAP/1.0 403 Forbidden\r\nEncapsulated: null-body=0\r\n\r\n";

#[tokio::test]
async fn test_live_ok_when_service_answers_200() {
    let icap = MockIcap::start(OPTIONS_OK, STATS_PAGE).await;
    let exporter = TestExporter::start(icap.port).await;

    let response = exporter.get("/health/live").await;
    assert_status(&response, StatusCode::OK);
    assert_header_starts_with(&response, "content-type", "application/json");

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["message"], "icap-service is available");
    assert_eq!(body["details"]["icap_status"], 200);
}

#[tokio::test]
async fn test_readiness_unavailable_on_non_200() {
    let icap = MockIcap::start(OPTIONS_FORBIDDEN, STATS_PAGE).await;
    let exporter = TestExporter::start(icap.port).await;

    let response = exporter.get("/health/readiness").await;
    assert_status(&response, StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["message"], "icap-service is not available");
    assert_eq!(body["details"]["icap_status"], 403);
}

#[tokio::test]
async fn test_live_unavailable_on_empty_response() {
    let icap = MockIcap::start(b"", STATS_PAGE).await;
    let exporter = TestExporter::start(icap.port).await;

    let response = exporter.get("/health/live").await;
    assert_status(&response, StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "icap-service is not available");
    assert!(body["details"].get("icap_status").is_none());
    assert_eq!(body["checks"][0]["name"], "icap_connect");
    assert_eq!(body["checks"][0]["status"], "pass");
    assert_eq!(body["checks"][1]["name"], "icap_response");
    assert_eq!(body["checks"][1]["status"], "fail");
}

#[tokio::test]
async fn test_live_unavailable_when_connection_refused() {
    let port = refused_port().await;
    let exporter = TestExporter::start(port).await;

    let response = exporter.get("/health/live").await;
    assert_status(&response, StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = response.json().await.unwrap();
    let checks = body["checks"].as_array().unwrap();
    assert_eq!(checks[0]["name"], "icap_connect");
    assert_eq!(checks[0]["status"], "fail");
}

#[tokio::test]
async fn test_health_probe_uses_options_service() {
    let icap = MockIcap::start(OPTIONS_OK, STATS_PAGE).await;
    let exporter = TestExporter::start_with(icap.port, &[("OPTIONS_SERVICE", "echo")]).await;

    let response = exporter.get("/health/readiness").await;
    assert_status(&response, StatusCode::OK);

    let requests = icap.requests();
    assert_eq!(requests.len(), 1);
    let request = String::from_utf8_lossy(&requests[0]);
    assert!(request.starts_with(&format!(
        "OPTIONS icap://127.0.0.1:{}/echo ICAP/1.0\r\n",
        icap.port
    )));
    assert!(request.contains("Encapsulated: null-body=0\r\n"));
}
