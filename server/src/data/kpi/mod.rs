//! Decoded KPI records, one schema per source topic

mod fields;
mod importer;
mod onos;
mod voltha;

use serde::de::DeserializeOwned;

pub use importer::ImporterKpi;
pub use onos::{OnosKpi, PortStat};
pub use voltha::{Context, Metadata, SliceData, SliceMetrics, VolthaKpi};

/// A record decoded from a raw JSON payload
///
/// Decoding is all-or-nothing: a payload either yields a complete record or
/// an error, never a partially filled one.
pub trait KpiRecord: DeserializeOwned + Send + 'static {
    fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}
