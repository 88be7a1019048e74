//! Request handlers for `/metrics` and the health endpoints.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use hyper::body::Incoming as IncomingBody;
use tracing::{debug, error, info};

use super::AppState;
use crate::health::ProbeType;
use crate::observability::RESULT_SUCCESS;

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Dispatch by path. The method is not checked.
pub(crate) async fn handle_request(
    req: Request<IncomingBody>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path();
    debug!(method = %req.method(), path, "Request");

    let response = match path {
        "/metrics" => metrics(&state).await,
        "/health/live" => health(&state, ProbeType::Liveness).await,
        "/health/readiness" => health(&state, ProbeType::Readiness).await,
        _ => respond(StatusCode::NOT_FOUND, CONTENT_TYPE_TEXT, "Not Found"),
    };

    Ok(response)
}

async fn metrics(state: &AppState) -> Response<Full<Bytes>> {
    let start = Instant::now();
    let cancel = state.shutdown.child_token();

    let snapshot = match state.collector.collect(&cancel).await {
        Ok(snapshot) => {
            state
                .metrics
                .record_scrape(RESULT_SUCCESS, start.elapsed().as_secs_f64());
            Some(snapshot)
        }
        Err(e) => {
            info!(error = %e, "Collection failed, exposing no ICAP metrics");
            state
                .metrics
                .record_scrape(e.kind(), start.elapsed().as_secs_f64());
            None
        }
    };

    match state.metrics.render(snapshot.as_ref()) {
        Ok(body) => respond(StatusCode::OK, prometheus::TEXT_FORMAT, body),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                CONTENT_TYPE_TEXT,
                "Failed to encode metrics",
            )
        }
    }
}

async fn health(state: &AppState, probe: ProbeType) -> Response<Full<Bytes>> {
    let cancel = state.shutdown.child_token();
    let status = state.health.check(probe, &cancel).await;

    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = serde_json::to_string(&status).unwrap_or_else(|_| "{}".to_string());

    respond(code, CONTENT_TYPE_JSON, body)
}

fn respond(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
