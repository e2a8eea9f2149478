//! HTTP middleware

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Fallback for unknown routes (also answers ingestion when it is disabled)
pub async fn handle_404(req: Request) -> impl IntoResponse {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "[404]");
    StatusCode::NOT_FOUND
}
