//! HTTP request handlers: Prometheus scrape endpoint and health.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use prometheus::{Encoder, TextEncoder};
use tracing::{error, warn};

use mesos_exporter_core::collector::{MasterCollector, StateSource};

pub(crate) type SharedCollector<S> = Arc<MasterCollector<S>>;

/// Builds the exporter router.
pub(crate) fn router<S: StateSource + 'static>(collector: SharedCollector<S>) -> Router {
    Router::new()
        .route("/metrics", get(handle_metrics::<S>))
        .route("/health", get(handle_health))
        .with_state(collector)
}

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

/// Runs one collection cycle and renders it in the text exposition format.
///
/// A master that cannot be reached fails the scrape with 502 rather than
/// serving stale values.
pub(crate) async fn handle_metrics<S: StateSource + 'static>(
    State(collector): State<SharedCollector<S>>,
) -> Response {
    // Fetch is blocking; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || collector.collect_cycle()).await;

    let families = match result {
        Ok(Ok(families)) => families,
        Ok(Err(e)) => {
            warn!(error = %e, "scrape failed");
            return (StatusCode::BAD_GATEWAY, e.to_string()).into_response();
        }
        Err(e) => {
            error!(error = %e, "collection cycle panicked");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "collection cycle panicked",
            )
                .into_response();
        }
    };

    let encoder = TextEncoder::new();
    let mut body = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut body) {
        error!(error = %e, "failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        body,
    )
        .into_response()
}
