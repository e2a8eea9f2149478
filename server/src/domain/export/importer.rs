//! Importer KPI handling
//!
//! Importer records are accepted and logged; they do not feed any series.

use super::dispatcher::KpiMapper;
use crate::data::kpi::ImporterKpi;
use crate::data::metrics::RegistryError;

#[derive(Debug, Default)]
pub struct ImporterMapper;

impl KpiMapper for ImporterMapper {
    type Record = ImporterKpi;

    fn map(&self, record: &ImporterKpi) -> Result<(), RegistryError> {
        tracing::info!(fields = record.fields.len(), "Received importer KPI");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::kpi::KpiRecord;
    use crate::data::metrics::MetricRegistry;

    #[test]
    fn test_importer_records_update_nothing() {
        let registry = MetricRegistry::new();
        let record = ImporterKpi::decode(br#"{"device": "olt-1", "bytes": 10}"#).unwrap();

        ImporterMapper.map(&record).unwrap();

        assert_eq!(registry.series_count(), 0);
    }
}
