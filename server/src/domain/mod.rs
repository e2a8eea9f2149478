//! Domain logic for KPI export
//!
//! - `export` - topic dispatch, KPI-to-series mapping and the bus consumer

pub mod export;

pub use export::{ExportEngine, ExportPipeline};
