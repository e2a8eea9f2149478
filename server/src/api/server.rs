//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware;
use super::routes::{health, ingest, scrape};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::metrics::MetricRegistry;
use crate::data::topics::Publisher;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Serve until shutdown is triggered; returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let app = self.app;
        let shutdown = app.shutdown.clone();

        let addr = SocketAddr::new(
            app.config
                .server
                .host
                .parse()
                .with_context(|| format!("Invalid server.host '{}'", app.config.server.host))?,
            app.config.server.port,
        );

        let publisher = app.config.ingest.enabled.then(|| app.publisher.clone());
        if publisher.is_none() {
            tracing::info!("HTTP ingestion disabled");
        }
        let router = build_router(app.registry.clone(), publisher);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!(%addr, "Listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

/// Assemble the HTTP surface; ingestion is only mounted when a publisher is given
pub fn build_router(registry: Arc<MetricRegistry>, publisher: Option<Publisher>) -> Router {
    let router = Router::new()
        .route("/api/v1/health", get(health::health))
        .merge(scrape::routes(registry));

    let router = match publisher {
        Some(publisher) => router.nest(
            "/api/v1/topics",
            ingest::routes(publisher).layer(RequestDecompressionLayer::new()),
        ),
        None => router,
    };

    router
        .fallback(middleware::handle_404)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}
