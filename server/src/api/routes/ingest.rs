//! KPI ingestion endpoint
//!
//! `POST /api/v1/topics/{topic}` queues the raw body on the envelope bus.
//! Routing and decoding happen later in the export pipeline, so any well
//! formed topic name is accepted here.

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;

use crate::core::constants::INGEST_RETRY_AFTER_SECS;
use crate::data::topics::{Publisher, TelemetryEnvelope, TopicError};

const MAX_TOPIC_LENGTH: usize = 249;

#[derive(Clone)]
pub struct IngestState {
    pub publisher: Publisher,
}

pub fn routes(publisher: Publisher) -> Router {
    Router::new()
        .route("/{topic}", post(ingest))
        .with_state(IngestState { publisher })
}

/// Topic names follow broker naming rules: `[A-Za-z0-9._-]`, at most 249 chars
pub fn is_valid_topic(topic: &str) -> bool {
    !topic.is_empty()
        && topic.len() <= MAX_TOPIC_LENGTH
        && topic
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

pub async fn ingest(
    State(state): State<IngestState>,
    Path(topic): Path<String>,
    body: Bytes,
) -> Response {
    if !is_valid_topic(&topic) {
        return (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "text/plain")],
            "Invalid topic",
        )
            .into_response();
    }

    match state.publisher.publish(TelemetryEnvelope::new(topic, body.to_vec())) {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(TopicError::BufferFull) => {
            tracing::warn!("Envelope bus full, rejecting KPI payload");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [(
                    HeaderName::from_static("retry-after"),
                    INGEST_RETRY_AFTER_SECS.to_string(),
                )],
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to publish KPI payload");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}
