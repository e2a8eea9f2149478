//! Prometheus scrape endpoint

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use crate::data::metrics::MetricRegistry;

pub fn routes(registry: Arc<MetricRegistry>) -> Router {
    Router::new()
        .route("/metrics", get(scrape))
        .with_state(registry)
}

pub async fn scrape(State(registry): State<Arc<MetricRegistry>>) -> Response {
    match registry.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, registry.content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
