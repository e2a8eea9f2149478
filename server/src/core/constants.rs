// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Topic Exporter";

/// Application name in lowercase (for paths, identifiers and log filters)
pub const APP_NAME_LOWER: &str = "topic_exporter";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".topic-exporter";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "topic-exporter.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "TOPIC_EXPORTER_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "TOPIC_EXPORTER_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "TOPIC_EXPORTER_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "TOPIC_EXPORTER_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

/// Maximum accepted KPI payload size (4 MB)
pub const DEFAULT_BODY_LIMIT: usize = 4 * 1024 * 1024;

// =============================================================================
// Ingestion
// =============================================================================

/// Environment variable for envelope bus capacity
pub const ENV_INGEST_BUFFER: &str = "TOPIC_EXPORTER_INGEST_BUFFER";

/// Environment variable to enable or disable HTTP ingestion
pub const ENV_INGEST_ENABLED: &str = "TOPIC_EXPORTER_INGEST_ENABLED";

/// Default envelope bus capacity (queued envelopes)
pub const DEFAULT_INGEST_BUFFER: usize = 10_000;

/// Default byte budget for queued payloads (256 MB)
pub const DEFAULT_INGEST_BUFFER_BYTES: usize = 256 * 1024 * 1024;

/// Retry-After hint returned when the bus is full
pub const INGEST_RETRY_AFTER_SECS: u64 = 1;

// =============================================================================
// Topics
// =============================================================================

/// VOLTHA adapter KPI slices
pub const TOPIC_VOLTHA: &str = "voltha.kpis";

/// ONOS port statistics
pub const TOPIC_ONOS: &str = "onos.kpis";

/// Importer KPIs
pub const TOPIC_IMPORTER: &str = "importer.kpis";

// =============================================================================
// Shutdown
// =============================================================================

/// Maximum time to wait for background tasks after a shutdown signal
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;
