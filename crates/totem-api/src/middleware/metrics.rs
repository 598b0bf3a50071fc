//! # Prometheus Metrics
//!
//! Request metrics go through the `metrics` facade and are exported by a
//! process-wide `metrics-exporter-prometheus` recorder, scraped at
//! `/metrics`.
//!
//! | Metric | Kind | Labels |
//! |--------|------|--------|
//! | `totem_http_requests_total` | counter | `method`, `path`, `status` |
//! | `totem_http_request_duration_seconds` | histogram | `method`, `path`, `status` |
//! | `totem_cache_lookups_total` | counter | `cache`, `outcome` |
//! | `totem_active_sessions` | gauge | |

use std::sync::OnceLock;
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

static RECORDER: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Install the Prometheus recorder once per process and return its handle.
///
/// `None` when another recorder was installed first.
pub fn handle() -> Option<PrometheusHandle> {
    RECORDER
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "Prometheus recorder not installed");
                None
            }
        })
        .clone()
}

/// Middleware that counts requests and records their latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        "totem_http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "totem_http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(started.elapsed().as_secs_f64());

    response
}

/// GET /metrics — Prometheus text exposition.
pub async fn render(State(state): State<AppState>) -> Response {
    let Some(handle) = handle() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder unavailable").into_response();
    };
    metrics::gauge!("totem_active_sessions").set(state.sessions.len() as f64);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response()
}
