use clap::Parser;

use std::path::PathBuf;

use super::constants::{ENV_CONFIG, ENV_HOST, ENV_INGEST_BUFFER, ENV_INGEST_ENABLED, ENV_PORT};

#[derive(Parser)]
#[command(name = "topic-exporter")]
#[command(version, about = "KPI topic to Prometheus exporter", long_about = None)]
pub struct Cli {
    /// Server host address
    #[arg(long, short = 'H', env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Envelope bus capacity (queued KPI messages)
    #[arg(long, env = ENV_INGEST_BUFFER)]
    pub ingest_buffer: Option<usize>,

    /// Enable or disable the HTTP ingestion endpoint
    #[arg(long = "ingest", env = ENV_INGEST_ENABLED)]
    pub ingest_enabled: Option<bool>,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub ingest_buffer: Option<usize>,
    pub ingest_enabled: Option<bool>,
}

/// Parse CLI arguments
pub fn parse() -> CliConfig {
    let cli = Cli::parse();
    CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        ingest_buffer: cli.ingest_buffer,
        ingest_enabled: cli.ingest_enabled,
    }
}
