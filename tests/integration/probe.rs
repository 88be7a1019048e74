//! Library-level probe tests against a scripted ICAP peer

use icap_exporter::health::HealthChecker;
use icap_exporter::icap::{IcapClient, IcapStatus, ProbeError, ProbeTarget};
use icap_exporter::stats::StatisticsParser;
use icap_exporter::{CollectionError, IcapCollector};
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

use crate::helpers::{refused_port, MockIcap, OPTIONS_OK, STATS_PAGE};

fn collector(port: u16) -> IcapCollector {
    IcapCollector::new(
        IcapClient::default(),
        StatisticsParser::new("gw_rebuild"),
        ProbeTarget::new("127.0.0.1", port),
        "info?view=text",
    )
}

fn checker(port: u16) -> HealthChecker {
    HealthChecker::new(
        IcapClient::default(),
        ProbeTarget::new("127.0.0.1", port),
        "gw_rebuild",
    )
}

#[tokio::test]
async fn test_collect_is_deterministic() {
    let icap = MockIcap::start(OPTIONS_OK, STATS_PAGE).await;
    let collector = collector(icap.port);
    let cancel = CancellationToken::new();

    let first = assert_ok!(collector.collect(&cancel).await);
    let second = assert_ok!(collector.collect(&cancel).await);

    assert!(first.same_counters(&second));
    assert_eq!(first.server().children, 10);
    assert_eq!(first.workload().bytes_in, 2148);
}

#[tokio::test]
async fn test_collect_refused() {
    let port = refused_port().await;
    let err = assert_err!(collector(port).collect(&CancellationToken::new()).await);

    match err {
        CollectionError::Probe(e) => assert!(e.is_connection_error()),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_collect_cancelled() {
    let icap = MockIcap::start(OPTIONS_OK, STATS_PAGE).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = assert_err!(collector(icap.port).collect(&cancel).await);
    assert!(matches!(err, CollectionError::Probe(ProbeError::Cancelled)));
}

#[tokio::test]
async fn test_evaluate_alive() {
    let icap = MockIcap::start(OPTIONS_OK, STATS_PAGE).await;
    let verdict = checker(icap.port).evaluate(&CancellationToken::new()).await;

    assert!(verdict.alive);
    assert_eq!(verdict.status, Some(IcapStatus::Code(200)));
    assert!(verdict.cause.is_none());
}

#[tokio::test]
async fn test_evaluate_garbage_status_line() {
    let icap = MockIcap::start(b"HTTP/1.1 200 OK\r\n\r\n", STATS_PAGE).await;
    let verdict = checker(icap.port).evaluate(&CancellationToken::new()).await;

    assert!(!verdict.alive);
    assert_eq!(verdict.status, Some(IcapStatus::Unknown));
}

#[tokio::test]
async fn test_evaluate_empty_response() {
    let icap = MockIcap::start(b"", STATS_PAGE).await;
    let verdict = checker(icap.port).evaluate(&CancellationToken::new()).await;

    assert!(!verdict.alive);
    assert!(verdict.status.is_none());
    assert!(matches!(verdict.cause, Some(ProbeError::EmptyResponse)));
}
