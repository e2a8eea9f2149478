//! Topic dispatch
//!
//! [`ExportEngine`] owns a table of `topic -> route` entries. A route decodes
//! the whole payload into its record type and only then hands it to the
//! mapper, so a payload that fails to decode never mutates a series.

use std::collections::HashMap;

use super::error::ExportError;
use super::importer::ImporterMapper;
use super::onos::OnosMapper;
use super::stats::ExportStats;
use super::voltha::VolthaMapper;
use crate::core::constants::{TOPIC_IMPORTER, TOPIC_ONOS, TOPIC_VOLTHA};
use crate::data::kpi::KpiRecord;
use crate::data::metrics::{MetricRegistry, RegistryError};

/// Projects one decoded record onto registry series
pub trait KpiMapper: Send + Sync + 'static {
    type Record: KpiRecord;

    fn map(&self, record: &Self::Record) -> Result<(), RegistryError>;
}

trait Route: Send + Sync {
    fn handle(&self, topic: &str, payload: &[u8]) -> Result<(), ExportError>;
}

impl<M: KpiMapper> Route for M {
    fn handle(&self, topic: &str, payload: &[u8]) -> Result<(), ExportError> {
        let record = M::Record::decode(payload).map_err(|source| ExportError::Decode {
            topic: topic.to_string(),
            source,
        })?;
        self.map(&record).map_err(|source| ExportError::Mapping {
            topic: topic.to_string(),
            source,
        })
    }
}

pub struct ExportEngine {
    routes: HashMap<String, Box<dyn Route>>,
    stats: ExportStats,
}

impl ExportEngine {
    /// Engine with the VOLTHA, ONOS and importer routes registered
    pub fn new(registry: &MetricRegistry) -> Result<Self, RegistryError> {
        let stats = ExportStats::register(registry)?;
        let voltha = VolthaMapper::register(registry, stats.unknown_titles().clone())?;
        let onos = OnosMapper::register(registry)?;

        Ok(Self::with_stats(stats)
            .route(TOPIC_VOLTHA, voltha)
            .route(TOPIC_ONOS, onos)
            .route(TOPIC_IMPORTER, ImporterMapper))
    }

    /// Engine with no routes
    pub fn with_stats(stats: ExportStats) -> Self {
        Self {
            routes: HashMap::new(),
            stats,
        }
    }

    /// Bind `topic` to a mapper, replacing any previous binding
    pub fn route<M: KpiMapper>(mut self, topic: impl Into<String>, mapper: M) -> Self {
        self.routes.insert(topic.into(), Box::new(mapper));
        self
    }

    /// Topics with a registered route, sorted
    pub fn topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        topics.sort_unstable();
        topics
    }

    pub fn is_routed(&self, topic: &str) -> bool {
        self.routes.contains_key(topic)
    }

    pub fn stats(&self) -> &ExportStats {
        &self.stats
    }

    /// Decode `payload` as the record type bound to `topic` and apply it
    ///
    /// Unrecognized topics and undecodable payloads are logged and reported
    /// without touching any series. Applied records and mapping failures are
    /// counted in `topic_exporter_messages_total`.
    pub fn export(&self, topic: &str, payload: &[u8]) -> Result<(), ExportError> {
        let Some(route) = self.routes.get(topic) else {
            tracing::warn!(topic, "Unrecognized topic, payload dropped");
            return Err(ExportError::UnrecognizedTopic(topic.to_string()));
        };

        let result = route.handle(topic, payload);
        match &result {
            Ok(()) => {
                tracing::trace!(topic, bytes = payload.len(), "Exported KPI payload");
                self.stats.record_message(topic, "ok");
            }
            Err(e @ ExportError::Decode { .. }) => {
                tracing::warn!(topic, error = %e, "Dropping undecodable payload");
            }
            Err(e) => {
                tracing::error!(topic, error = %e, "Failed to apply KPI record");
                self.stats.record_message(topic, e.result_label());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::data::metrics::{SeriesHandle, UpdateMode};
    use crate::domain::export::voltha::VOLTHA_LABELS;

    const VOLTHA_ETHERNET: &str = r#"{
        "type": "slice",
        "slice_data": [{
            "metadata": {
                "title": "Ethernet",
                "logical_device_id": "ld",
                "serial_no": "sn",
                "device_id": "dev",
                "context": {"intf_id": "1", "pon_id": "0", "port_no": "16"}
            },
            "metrics": {"tx_bytes": 11, "rx_bytes": 22, "tx_packets": 3,
                        "rx_packets": 4, "tx_error_packets": 0, "rx_error_packets": 1}
        }]
    }"#;

    const ETHERNET_LABELS: [&str; 7] = ["ld", "sn", "dev", "1", "0", "16", "Ethernet"];

    fn engine() -> (MetricRegistry, ExportEngine) {
        let registry = MetricRegistry::new();
        let engine = ExportEngine::new(&registry).unwrap();
        (registry, engine)
    }

    fn gauge(registry: &MetricRegistry, name: &str, labels: &[&str]) -> SeriesHandle {
        registry.register(name, "test gauge", labels).unwrap()
    }

    fn voltha_gauge(registry: &MetricRegistry, name: &str) -> SeriesHandle {
        gauge(registry, name, &VOLTHA_LABELS)
    }

    #[test]
    fn test_default_routes() {
        let (_registry, engine) = engine();
        assert_eq!(
            engine.topics(),
            vec!["importer.kpis", "onos.kpis", "voltha.kpis"]
        );
        assert!(engine.is_routed("voltha.kpis"));
        assert!(!engine.is_routed("VOLTHA.KPIS"));
    }

    #[test]
    fn test_voltha_ethernet_export() {
        let (registry, engine) = engine();

        engine
            .export("voltha.kpis", VOLTHA_ETHERNET.as_bytes())
            .unwrap();

        let tx = voltha_gauge(&registry, "voltha_tx_bytes_total");
        let rx_err = voltha_gauge(&registry, "voltha_rx_error_packets_total");
        assert_eq!(tx.get(&ETHERNET_LABELS), Some(11.0));
        assert_eq!(rx_err.get(&ETHERNET_LABELS), Some(1.0));
        assert_eq!(
            engine.stats().messages().get(&["voltha.kpis", "ok"]),
            Some(1.0)
        );
    }

    #[test]
    fn test_onos_export() {
        let (registry, engine) = engine();

        engine
            .export(
                "onos.kpis",
                br#"{"deviceId": "of:1", "ports": [{"portId": "7", "pktRxDrp": 9}]}"#,
            )
            .unwrap();

        let drops = gauge(&registry, "onos_rx_drop_packets_total", &["device_id", "port_id"]);
        assert_eq!(drops.get(&["of:1", "7"]), Some(9.0));
    }

    #[test]
    fn test_importer_export_is_noop() {
        let (registry, engine) = engine();
        let before = registry.series_count();

        engine
            .export("importer.kpis", br#"{"anything": [1, 2, 3]}"#)
            .unwrap();

        // only the message counter moves
        assert_eq!(registry.series_count(), before + 1);
        assert_eq!(
            engine.stats().messages().get(&["importer.kpis", "ok"]),
            Some(1.0)
        );
    }

    #[test]
    fn test_unrecognized_topic_mutates_nothing() {
        let (registry, engine) = engine();

        let err = engine
            .export("foo.kpis", VOLTHA_ETHERNET.as_bytes())
            .unwrap_err();

        assert!(matches!(err, ExportError::UnrecognizedTopic(ref t) if t == "foo.kpis"));
        assert_eq!(registry.series_count(), 0);
    }

    #[test]
    fn test_malformed_payload_is_decode_error_without_partial_updates() {
        let (registry, engine) = engine();
        // first slice is valid, the document as a whole is not
        let truncated = &VOLTHA_ETHERNET[..VOLTHA_ETHERNET.len() - 10];

        let before = registry.encode().unwrap();

        let err = engine.export("voltha.kpis", truncated.as_bytes()).unwrap_err();

        assert!(matches!(err, ExportError::Decode { ref topic, .. } if topic == "voltha.kpis"));
        assert_eq!(
            engine.stats().messages().get(&["voltha.kpis", "decode_error"]),
            None
        );
        assert_eq!(registry.series_count(), 0);
        assert_eq!(registry.encode().unwrap(), before);
    }

    #[test]
    fn test_non_string_label_is_decode_error_without_updates() {
        let (registry, engine) = engine();
        let numeric_pon = VOLTHA_ETHERNET.replace(r#""pon_id": "0""#, r#""pon_id": 0"#);
        let bool_upstream = r#"{"slice_data": [{
            "metadata": {"title": "Ethernet_Bridge_Port_History", "device_id": "dev",
                         "context": {"upstream": true}},
            "metrics": {"tx_bytes": 5}
        }]}"#;

        for payload in [numeric_pon.as_str(), bool_upstream] {
            let err = engine.export("voltha.kpis", payload.as_bytes()).unwrap_err();
            assert!(matches!(err, ExportError::Decode { .. }));
        }
        assert_eq!(registry.series_count(), 0);
    }

    #[test]
    fn test_decode_error_does_not_block_later_exports() {
        let (registry, engine) = engine();

        assert!(engine.export("onos.kpis", b"not json").is_err());
        engine
            .export("voltha.kpis", VOLTHA_ETHERNET.as_bytes())
            .unwrap();

        let tx = voltha_gauge(&registry, "voltha_tx_packets_total");
        assert_eq!(tx.get(&ETHERNET_LABELS), Some(3.0));
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let (_registry, engine) = engine();

        let err = engine
            .export("onos.kpis", br#"{"deviceId": "d", "ports": {"portId": 1}}"#)
            .unwrap_err();
        assert_eq!(err.result_label(), "decode_error");

        let err = engine.export("importer.kpis", b"[1, 2]").unwrap_err();
        assert_eq!(err.result_label(), "decode_error");
    }

    struct AddOne(SeriesHandle);

    #[derive(serde::Deserialize)]
    struct Tick {}

    impl KpiRecord for Tick {}

    impl KpiMapper for AddOne {
        type Record = Tick;

        fn map(&self, _record: &Tick) -> Result<(), RegistryError> {
            self.0.update(UpdateMode::Add, &["x"], 1.0)
        }
    }

    #[test]
    fn test_custom_route() {
        let registry = MetricRegistry::new();
        let stats = ExportStats::register(&registry).unwrap();
        let ticks = gauge(&registry, "ticks", &["k"]);
        let engine = ExportEngine::with_stats(stats).route("ticks", AddOne(ticks.clone()));

        for _ in 0..3 {
            engine.export("ticks", b"{}").unwrap();
        }

        assert_eq!(engine.topics(), vec!["ticks"]);
        assert_eq!(ticks.get(&["x"]), Some(3.0));
    }

    #[test]
    fn test_concurrent_bridge_port_exports_lose_nothing() {
        let registry = MetricRegistry::new();
        let engine = Arc::new(ExportEngine::new(&registry).unwrap());
        let payload = r#"{"slice_data": [{
            "metadata": {"title": "Ethernet_Bridge_Port_History", "logical_device_id": "ld",
                         "serial_no": "sn", "device_id": "dev",
                         "context": {"upstream": "True"}},
            "metrics": {"packets": 1, "octets": 64}
        }]}"#;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = engine.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        engine.export("voltha.kpis", payload.as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let labels = [
            "ld",
            "sn",
            "dev",
            "NA",
            "NA",
            "NA",
            "Ethernet_Bridge_Port_History",
        ];
        let tx_packets = voltha_gauge(&registry, "voltha_tx_packets_total");
        let tx_bytes = voltha_gauge(&registry, "voltha_tx_bytes_total");
        assert_eq!(tx_packets.get(&labels), Some(2000.0));
        assert_eq!(tx_bytes.get(&labels), Some(128_000.0));
    }
}
