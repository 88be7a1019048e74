//! `/metrics` endpoint tests

use std::time::Duration;

use reqwest::StatusCode;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::helpers::{
    assert_body_contains, assert_header_starts_with, assert_status, refused_port, MockIcap,
    TestExporter, OPTIONS_OK, STATS_PAGE,
};

#[tokio::test]
async fn test_metrics_exposes_all_gauges() {
    let icap = MockIcap::start(OPTIONS_OK, STATS_PAGE).await;
    let exporter = TestExporter::start(icap.port).await;

    let response = exporter.get("/metrics").await;
    assert_status(&response, StatusCode::OK);
    assert_header_starts_with(&response, "content-type", "text/plain; version=0.0.4");

    let body = response.text().await.unwrap();
    for line in [
        "gw_icap_server_children_number 10",
        "gw_icap_server_free_servers 8",
        "gw_icap_server_used_servers 2",
        "gw_icap_server_started_processes 10",
        "gw_icap_server_crashed_processes 0",
        "gw_rebuild_reqmods 3",
        "gw_rebuild_respmods 120",
        "gw_rebuild_allow204 4",
        "gw_rebuild_scan_rebuilt 115",
        "gw_rebuild_bytes_in 2148",
        "gw_rebuild_bytes_out 7",
        "gw_rebuild_http_bytes_in 10240",
        "gw_rebuild_http_bytes_out 12800",
        "gw_rebuild_body_bytes_scanned 3075",
        "icap_exporter_scrapes_total{result=\"success\"} 1",
        "icap_exporter_last_scrape_success 1",
    ] {
        assert!(body.contains(line), "missing `{}` in:\n{}", line, body);
    }
    assert_eq!(body.matches("# TYPE gw_").count(), 24);
}

#[tokio::test]
async fn test_failed_scrape_exposes_no_icap_gauges() {
    let port = refused_port().await;
    let exporter = TestExporter::start(port).await;

    let response = exporter.get("/metrics").await;
    assert_status(&response, StatusCode::OK);

    let body = response.text().await.unwrap();
    assert!(!body.contains("gw_"), "unexpected ICAP gauges:\n{}", body);
    assert!(body.contains("icap_exporter_scrapes_total{result=\"connect\"} 1"));
    assert!(body.contains("icap_exporter_last_scrape_success 0"));
}

#[tokio::test]
async fn test_empty_statistics_response_fails_closed() {
    let icap = MockIcap::start(OPTIONS_OK, b"").await;
    let exporter = TestExporter::start(icap.port).await;

    let response = exporter.get("/metrics").await;
    assert_status(&response, StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(!body.contains("gw_rebuild_"));
    assert!(body.contains("icap_exporter_scrapes_total{result=\"empty_response\"} 1"));
}

#[tokio::test]
async fn test_each_scrape_probes_afresh() {
    let icap = MockIcap::start(OPTIONS_OK, STATS_PAGE).await;
    let exporter = TestExporter::start(icap.port).await;

    let first = exporter.get("/metrics").await.text().await.unwrap();
    let second = exporter.get("/metrics").await.text().await.unwrap();

    assert!(first.contains("gw_rebuild_bytes_in 2148"));
    assert!(second.contains("gw_rebuild_bytes_in 2148"));
    assert!(second.contains("icap_exporter_scrapes_total{result=\"success\"} 2"));
    assert_eq!(icap.requests().len(), 2);
}

#[tokio::test]
async fn test_reqmod_null_body_matches_embedded_request() {
    let icap = MockIcap::start(OPTIONS_OK, STATS_PAGE).await;
    let exporter = TestExporter::start(icap.port).await;

    let response = exporter.get("/metrics").await;
    assert_status(&response, StatusCode::OK);

    let requests = icap.requests();
    assert_eq!(requests.len(), 1);
    let request = String::from_utf8_lossy(&requests[0]).into_owned();

    assert!(request.starts_with(&format!(
        "REQMOD icap://127.0.0.1:{}/info?view=text ICAP/1.0\r\n",
        icap.port
    )));

    let (head, embedded) = request.split_once("\r\n\r\n").unwrap();
    let encapsulated = head
        .lines()
        .find_map(|line| line.strip_prefix("Encapsulated: "))
        .unwrap();
    let null_body: usize = encapsulated
        .strip_prefix("req-hdr=0, null-body=")
        .unwrap()
        .parse()
        .unwrap();

    assert_eq!(null_body, embedded.len());
    assert!(embedded.starts_with("GET any HTTP/1.0\r\n"));
    assert!(embedded.ends_with("\r\n\r\n"));
}

#[tokio::test]
async fn test_unknown_path_returns_404() {
    let icap = MockIcap::start(OPTIONS_OK, STATS_PAGE).await;
    let exporter = TestExporter::start(icap.port).await;

    let response = exporter.get("/nonexistent").await;
    assert_status(&response, StatusCode::NOT_FOUND);
    assert_body_contains(response, "Not Found").await;
    assert!(icap.requests().is_empty());
}

#[tokio::test]
async fn test_silent_connection_closed_after_idle_timeout() {
    let icap = MockIcap::start(OPTIONS_OK, STATS_PAGE).await;
    let exporter = TestExporter::start_with(icap.port, &[("IDLE_TIMEOUT", "200ms")]).await;

    let addr = exporter.base_url.trim_start_matches("http://");
    let mut socket = TcpStream::connect(addr).await.unwrap();

    let mut buf = [0u8; 16];
    let read = tokio::time::timeout(Duration::from_secs(5), socket.read(&mut buf))
        .await
        .expect("connection should be closed by the exporter");
    assert_eq!(read.unwrap(), 0);

    // Connections that do send a request are still served.
    let response = exporter.get("/metrics").await;
    assert_status(&response, StatusCode::OK);
}
