//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::cli::{self, CliConfig};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME, APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::metrics::MetricRegistry;
use crate::data::topics::{Publisher, Subscriber, TopicConfig, envelope_bus};
use crate::domain::{ExportEngine, ExportPipeline};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub registry: Arc<MetricRegistry>,
    pub engine: Arc<ExportEngine>,
    pub publisher: Publisher,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let cli_config = cli::parse();
        let (app, subscriber) = Self::init(&cli_config)?;
        Self::start_server(app, subscriber).await
    }

    fn init(cli: &CliConfig) -> Result<(Self, Subscriber)> {
        let config = AppConfig::load(cli)?;

        let registry = Arc::new(MetricRegistry::new());
        let engine = Arc::new(
            ExportEngine::new(&registry).context("Failed to register export metrics")?,
        );
        tracing::debug!(topics = ?engine.topics(), "Export routes registered");

        let (publisher, subscriber) = envelope_bus(&TopicConfig {
            channel_capacity: config.ingest.buffer,
            buffer_bytes: config.ingest.buffer_bytes,
        })
        .context("Failed to create envelope bus")?;

        let app = Self {
            shutdown: ShutdownService::new(),
            config,
            registry,
            engine,
            publisher,
        };
        Ok((app, subscriber))
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self, subscriber: Subscriber) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks(subscriber).await;

        tracing::info!(
            host = %app.config.server.host,
            port = app.config.server.port,
            ingest = app.config.ingest.enabled,
            "{} started",
            APP_NAME
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    pub async fn start_background_tasks(&self, subscriber: Subscriber) {
        let pipeline = ExportPipeline::new(self.engine.clone());
        self.shutdown
            .register(pipeline.start(subscriber, self.shutdown.subscribe()))
            .await;

        tracing::debug!("Background tasks started");
    }
}
