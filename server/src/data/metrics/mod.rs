//! Metric registry shared by the export pipeline and the scrape endpoint

mod error;
mod registry;

pub use error::RegistryError;
pub use registry::{CounterHandle, MetricRegistry, SeriesHandle, UpdateMode};
