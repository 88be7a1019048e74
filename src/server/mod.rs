//! Exporter HTTP server.
//!
//! Serves three endpoints over HTTP/1.1:
//!
//! - `/metrics` - runs one collection cycle and returns Prometheus text
//! - `/health/live`, `/health/readiness` - run an `OPTIONS` probe, 200 or 503
//!
//! Every request probes the ICAP service afresh; nothing is cached between
//! requests. A connection that sends nothing within the idle timeout is closed
//! before it reaches hyper.
//!
//! # Example
//!
//! ```rust,ignore
//! use icap_exporter::{Config, ExporterServer};
//!
//! let config = Config::from_env()?;
//! let server = ExporterServer::new(&config)?;
//! server.run().await?;
//! ```
//!
//! # Graceful Shutdown
//!
//! [`ExporterServer::trigger_shutdown`] stops the accept loop, cancels
//! in-flight probes and lets open connections finish their current response.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::collector::IcapCollector;
use crate::config::Config;
use crate::health::HealthChecker;
use crate::observability::ExporterMetrics;
use crate::stats::StatisticsParser;

/// How long open connections may take to finish after shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared request-handling state.
pub(crate) struct AppState {
    pub(crate) collector: IcapCollector,
    pub(crate) health: HealthChecker,
    pub(crate) metrics: ExporterMetrics,
    pub(crate) shutdown: CancellationToken,
}

/// HTTP server exposing ICAP metrics and health.
#[derive(Clone)]
pub struct ExporterServer {
    listen_addr: SocketAddr,
    header_read_timeout: Duration,
    idle_timeout: Duration,
    state: Arc<AppState>,
}

impl ExporterServer {
    /// Build the server and its probe components from configuration.
    pub fn new(config: &Config) -> Result<Self, prometheus::Error> {
        let icap = &config.icap;
        let client = icap.client();
        let target = icap.target();

        let collector = IcapCollector::new(
            client.clone(),
            StatisticsParser::new(&icap.stats_service),
            target.clone(),
            icap.service.clone(),
        );
        let health = HealthChecker::new(client, target, icap.options_service.clone());

        Ok(Self {
            listen_addr: config.server.listen_addr,
            header_read_timeout: config.server.header_read_timeout,
            idle_timeout: config.server.idle_timeout,
            state: Arc::new(AppState {
                collector,
                health,
                metrics: ExporterMetrics::new()?,
                shutdown: CancellationToken::new(),
            }),
        })
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(self.listen_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown.
    pub async fn serve(
        &self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            "Exporter listening on http://{} (target: {})",
            listener.local_addr()?,
            self.state.collector.target()
        );

        let graceful = GracefulShutdown::new();
        let shutdown = self.state.shutdown.clone();
        // Connections that sent their first byte, handed back from the idle waiters
        let (ready_tx, mut ready_rx) = mpsc::unbounded_channel::<(TcpStream, SocketAddr)>();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let ready = ready_tx.clone();
                        let shutdown = shutdown.clone();
                        let idle_timeout = self.idle_timeout;
                        tokio::spawn(async move {
                            let active = tokio::select! {
                                _ = shutdown.cancelled() => false,
                                active = wait_for_request(&stream, idle_timeout) => active,
                            };
                            if active {
                                let _ = ready.send((stream, remote_addr));
                            } else {
                                debug!(remote = %remote_addr, "Connection idle timeout or closed");
                            }
                        });
                    }
                    Err(e) => warn!(error = %e, "Accept failed"),
                },
                Some((stream, remote_addr)) = ready_rx.recv() => {
                    let _ = stream.set_nodelay(true);

                    let state = Arc::clone(&self.state);
                    let service =
                        service_fn(move |req| routes::handle_request(req, Arc::clone(&state)));

                    let conn = http1::Builder::new()
                        .timer(TokioTimer::new())
                        .header_read_timeout(Some(self.header_read_timeout))
                        .keep_alive(true)
                        .serve_connection(TokioIo::new(stream), service);
                    let conn = graceful.watch(conn);

                    tokio::spawn(async move {
                        if let Err(err) = conn.await {
                            debug!(remote = %remote_addr, "Connection error: {:?}", err);
                        }
                    });
                }
                _ = shutdown.cancelled() => {
                    debug!("Accept loop received shutdown signal");
                    break;
                }
            }
        }

        tokio::select! {
            _ = graceful.shutdown() => debug!("All connections drained"),
            _ = tokio::time::sleep(DRAIN_TIMEOUT) => {
                warn!("Drain timeout reached, closing remaining connections");
            }
        }

        Ok(())
    }

    /// Token cancelled on shutdown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.state.shutdown.clone()
    }

    /// Trigger graceful shutdown.
    pub fn trigger_shutdown(&self) {
        self.state.shutdown.cancel();
    }

    /// Get the metrics registry.
    pub fn metrics(&self) -> &ExporterMetrics {
        &self.state.metrics
    }
}

/// Wait up to `idle_timeout` for the first request byte.
async fn wait_for_request(stream: &TcpStream, idle_timeout: Duration) -> bool {
    let mut peek_buf = [0u8; 1];
    match tokio::time::timeout(idle_timeout, stream.peek(&mut peek_buf)).await {
        Ok(Ok(n)) => n > 0,
        Ok(Err(e)) => {
            debug!("Peek error: {:?}", e);
            false
        }
        Err(_) => false,
    }
}
