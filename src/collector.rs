//! Per-cycle metrics collection.
//!
//! One `collect()` call runs the work-simulation probe once and parses both
//! counter groups from whatever bytes came back. Nothing is cached: a failed
//! cycle yields an error and no snapshot.

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

use crate::icap::{IcapClient, ProbeError, ProbeTarget};
use crate::stats::{MetricsSnapshot, StatisticsParser};

/// Reason a collection cycle produced no snapshot.
#[derive(Debug)]
pub enum CollectionError {
    /// Transport-level failure of the work-simulation probe.
    Probe(ProbeError),
    /// The service closed the connection without sending anything.
    EmptyResponse,
}

impl CollectionError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CollectionError::Probe(e) => e.kind(),
            CollectionError::EmptyResponse => "empty_response",
        }
    }
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::Probe(e) => write!(f, "collection probe failed: {}", e),
            CollectionError::EmptyResponse => write!(f, "icap-service returned an empty response"),
        }
    }
}

impl std::error::Error for CollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectionError::Probe(e) => Some(e),
            CollectionError::EmptyResponse => None,
        }
    }
}

impl From<ProbeError> for CollectionError {
    fn from(e: ProbeError) -> Self {
        match e {
            ProbeError::EmptyResponse => CollectionError::EmptyResponse,
            other => CollectionError::Probe(other),
        }
    }
}

/// Runs collection cycles against one ICAP service.
#[derive(Debug, Clone)]
pub struct IcapCollector {
    client: IcapClient,
    parser: StatisticsParser,
    target: ProbeTarget,
    service: String,
}

impl IcapCollector {
    /// `service` is the REQMOD path that returns statistics; `parser` decides
    /// which service's workload counters are read from the page.
    pub fn new(
        client: IcapClient,
        parser: StatisticsParser,
        target: ProbeTarget,
        service: impl Into<String>,
    ) -> Self {
        Self {
            client,
            parser,
            target,
            service: service.into(),
        }
    }

    pub fn target(&self) -> &ProbeTarget {
        &self.target
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Run one collection cycle.
    ///
    /// Statistics are parsed regardless of the ICAP status code.
    pub async fn collect(
        &self,
        cancel: &CancellationToken,
    ) -> Result<MetricsSnapshot, CollectionError> {
        let span = tracing::info_span!(
            "collect",
            probe_id = %Uuid::new_v4(),
            target = %self.target,
            service = %self.service,
        );

        async {
            let response = self
                .client
                .probe_work(&self.target, &self.service, cancel)
                .await?
                .require_non_empty()
                .map_err(|e| {
                    warn!(target: "probe", "Statistics response was empty");
                    CollectionError::from(e)
                })?;

            let status = response.status();
            if !status.is_ok() {
                debug!(status = %status, "Statistics probe returned non-200 status");
            }

            let server = self.parser.parse_server_process_counters(response.as_bytes());
            let workload = self.parser.parse_workload_counters(response.as_bytes());

            debug!(
                bytes = response.len(),
                children = server.children,
                reqmods = workload.reqmods,
                "Collected ICAP statistics"
            );

            Ok::<_, CollectionError>(MetricsSnapshot::new(server, workload))
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const PAGE: &[u8] = b"ICAP/1.0 200 OK\r\n\r\n\
        Children number: 5\n\
        Free Servers: 4\n\
        Service gw_rebuild REQMODS : 17\n\
        Service gw_rebuild BYTES IN : 2 Kbs 100 bytes\n";

    async fn serve(reply: &'static [u8], connections: usize) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            for _ in 0..connections {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = Vec::new();
                socket.read_to_end(&mut request).await.unwrap();
                socket.write_all(reply).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });
        port
    }

    fn collector(port: u16) -> IcapCollector {
        IcapCollector::new(
            IcapClient::default(),
            StatisticsParser::new("gw_rebuild"),
            ProbeTarget::new("127.0.0.1", port),
            "info?view=text",
        )
    }

    #[tokio::test]
    async fn test_collect_parses_both_groups() {
        let port = serve(PAGE, 1).await;
        let snapshot = collector(port)
            .collect(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(snapshot.server().children, 5);
        assert_eq!(snapshot.server().free, 4);
        assert_eq!(snapshot.server().crashed, 0);
        assert_eq!(snapshot.workload().reqmods, 17);
        assert_eq!(snapshot.workload().bytes_in, 2148);
    }

    #[tokio::test]
    async fn test_collect_parses_despite_error_status() {
        let port = serve(b"ICAP/1.0 500 Server Error\r\n\r\nUsed Servers: 9\n", 1).await;
        let snapshot = collector(port)
            .collect(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(snapshot.server().used, 9);
    }

    #[tokio::test]
    async fn test_collect_is_deterministic() {
        let port = serve(PAGE, 2).await;
        let collector = collector(port);
        let cancel = CancellationToken::new();

        let first = collector.collect(&cancel).await.unwrap();
        let second = collector.collect(&cancel).await.unwrap();
        assert!(first.same_counters(&second));
    }

    #[tokio::test]
    async fn test_collect_empty_response() {
        let port = serve(b"", 1).await;
        let err = collector(port)
            .collect(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CollectionError::EmptyResponse));
        assert_eq!(err.kind(), "empty_response");
    }

    #[tokio::test]
    async fn test_collect_connection_refused() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = collector(port)
            .collect(&CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            CollectionError::Probe(e) => assert!(e.is_connection_error()),
            other => panic!("unexpected error: {}", other),
        }
    }
}
