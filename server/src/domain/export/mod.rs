//! Export Engine
//!
//! Turns `(topic, payload)` envelopes into registry updates:
//!
//! - `dispatcher` - topic routing table and the `export` entry point
//! - `voltha` - title-driven VOLTHA slice mapping
//! - `onos` - ONOS per-port mapping
//! - `importer` - importer records (logged only)
//! - `pipeline` - bus consumer task
//! - `stats` - self-observability counters

mod dispatcher;
mod error;
mod importer;
mod onos;
mod pipeline;
mod stats;
mod voltha;

pub use dispatcher::{ExportEngine, KpiMapper};
pub use error::ExportError;
pub use importer::ImporterMapper;
pub use onos::{ONOS_LABELS, OnosMapper};
pub use pipeline::ExportPipeline;
pub use stats::{ExportStats, MESSAGES_TOTAL, UNKNOWN_TITLES_TOTAL};
pub use voltha::{MAX_UNKNOWN_TITLES, NOT_APPLICABLE, OTHER_TITLE, VOLTHA_LABELS, VolthaMapper};
