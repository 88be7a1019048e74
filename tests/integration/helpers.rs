//! Test helpers and utilities

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use icap_exporter::{Config, ExporterServer};
use reqwest::{Client, Response, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Statistics page as served by c-icap `info?view=text`.
pub const STATS_PAGE: &[u8] = b"ICAP/1.0 200 OK\r\n\
Server: C-ICAP/0.5.6\r\n\
Connection: close\r\n\
Encapsulated: res-hdr=0, res-body=75\r\n\
\r\n\
HTTP/1.0 200 OK\r\n\
Content-Type: text/plain\r\n\
\r\n\
Running Servers Statistics\n\
===========================\n\
Children number: 10\n\
Free Servers: 8\n\
Used Servers: 2\n\
Started Processes: 10\n\
Closed Processes: 0\n\
Crashed Processes: 0\n\
Closing Processes: 0\n\
\n\
Service gw_rebuild Statistics\n\
==================\n\
Service gw_rebuild REQMODS : 3\n\
Service gw_rebuild RESPMODS : 120\n\
Service gw_rebuild OPTIONS : 57\n\
Service gw_rebuild ALLOW 204 : 4\n\
Service gw_rebuild REQUESTS SCANNED : 118\n\
Service gw_rebuild REBUILD FAILURES : 1\n\
Service gw_rebuild REBUILD ERRORS : 2\n\
Service gw_rebuild SCAN REBUILT : 115\n\
Service gw_rebuild UNPROCESSED : 0\n\
Service gw_rebuild UNPROCESSABLE : 0\n\
Service gw_rebuild BYTES IN : 2 Kbs 100 bytes\n\
Service gw_rebuild BYTES OUT : 0 Kbs 7 bytes\n\
Service gw_rebuild HTTP BYTES IN : 10 Kbs 0 bytes\n\
Service gw_rebuild HTTP BYTES OUT : 12 Kbs 512 bytes\n\
Service gw_rebuild BODY BYTES IN : 1 Kbs 1 bytes\n\
Service gw_rebuild BODY BYTES OUT : 1 Kbs 2 bytes\n\
Service gw_rebuild BODY BYTES SCANNED : 3 Kbs 3 bytes\n";

/// OPTIONS answer from a healthy service.
pub const OPTIONS_OK: &[u8] = b"ICAP/1.0 200 OK\r\n\
Methods: RESPMOD, REQMOD\r\n\
Service: Glasswall Rebuild\r\n\
Encapsulated: null-body=0\r\n\
\r\n";

/// Scripted ICAP peer on loopback.
///
/// Reads each request until the client half-closes, records it and answers
/// with the reply configured for its method.
pub struct MockIcap {
    pub port: u16,
    requests: Arc<Mutex<Vec<Vec<u8>>>>,
    handle: tokio::task::JoinHandle<()>,
}

#[allow(dead_code)]
impl MockIcap {
    pub async fn start(options_reply: &'static [u8], reqmod_reply: &'static [u8]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock ICAP server");
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let handle = tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    if socket.read_to_end(&mut request).await.is_err() {
                        return;
                    }
                    let reply = if request.starts_with(b"OPTIONS ") {
                        options_reply
                    } else {
                        reqmod_reply
                    };
                    recorded.lock().unwrap().push(request);
                    let _ = socket.write_all(reply).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            port,
            requests,
            handle,
        }
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockIcap {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A loopback port with nothing listening on it.
pub async fn refused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Exporter instance serving on an ephemeral loopback port.
pub struct TestExporter {
    pub base_url: String,
    pub client: Client,
    server: ExporterServer,
}

#[allow(dead_code)]
impl TestExporter {
    /// Start an exporter probing `127.0.0.1:icap_port`.
    pub async fn start(icap_port: u16) -> Self {
        Self::start_with(icap_port, &[]).await
    }

    /// Start with extra environment overrides.
    pub async fn start_with(icap_port: u16, extra: &[(&str, &str)]) -> Self {
        let mut vars: HashMap<String, String> = HashMap::new();
        vars.insert("ICAP_HOST".into(), "127.0.0.1".into());
        vars.insert("ICAP_PORT".into(), icap_port.to_string());
        vars.insert("CONNECT_TIMEOUT".into(), "2s".into());
        vars.insert("READ_TIMEOUT".into(), "2s".into());
        for (key, value) in extra {
            vars.insert(key.to_string(), value.to_string());
        }
        let env = move |key: &str| vars.get(key).cloned();

        let config = Config::from_lookup(&env).expect("Failed to load test config");
        let server = ExporterServer::new(&config).expect("Failed to create exporter");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let serving = server.clone();
        tokio::spawn(async move {
            let _ = serving.serve(listener).await;
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            client,
            server,
        }
    }

    /// Make a GET request to the exporter
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub fn server(&self) -> &ExporterServer {
        &self.server
    }
}

impl Drop for TestExporter {
    fn drop(&mut self) {
        self.server.trigger_shutdown();
    }
}

/// Assert that response has expected status
pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Assert that response contains header with prefix
pub fn assert_header_starts_with(response: &Response, name: &str, prefix: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert!(
        value.starts_with(prefix),
        "Header '{}' expected to start with '{}', got '{}'",
        name,
        prefix,
        value
    );
}

/// Assert that response body contains substring
#[allow(dead_code)]
pub async fn assert_body_contains(response: Response, substring: &str) {
    let body = response.text().await.expect("Failed to read body");
    assert!(
        body.contains(substring),
        "Body does not contain '{}'. Body: {}",
        substring,
        &body[..body.len().min(500)]
    );
}
