//! Data layer
//!
//! - `kpi` - wire records for each KPI topic
//! - `metrics` - labeled series registry and Prometheus exposition
//! - `topics` - in-process envelope bus

pub mod kpi;
pub mod metrics;
pub mod topics;
