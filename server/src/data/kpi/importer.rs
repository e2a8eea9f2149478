//! Importer KPI records (`importer.kpis`)
//!
//! The importer schema is not mapped to any series yet; records are decoded
//! as an opaque JSON object so malformed payloads are still rejected.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::KpiRecord;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ImporterKpi {
    pub fields: Map<String, Value>,
}

impl KpiRecord for ImporterKpi {}
