//! VOLTHA KPI records (`voltha.kpis`)

use serde::Deserialize;

use super::KpiRecord;
use super::fields::{label, nullable, reading};

/// One KPI publication: a batch of per-interface slices
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolthaKpi {
    #[serde(default, rename = "type", deserialize_with = "label")]
    pub kind: String,
    #[serde(default, deserialize_with = "reading")]
    pub ts: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub slice_data: Vec<SliceData>,
}

impl KpiRecord for VolthaKpi {}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SliceData {
    #[serde(default, deserialize_with = "nullable")]
    pub metadata: Metadata,
    #[serde(default, deserialize_with = "nullable")]
    pub metrics: SliceMetrics,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "label")]
    pub title: String,
    #[serde(default, deserialize_with = "label")]
    pub logical_device_id: String,
    #[serde(default, rename = "serial_no", deserialize_with = "label")]
    pub serial_number: String,
    #[serde(default, deserialize_with = "label")]
    pub device_id: String,
    #[serde(default, deserialize_with = "reading")]
    pub ts: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub context: Context,
}

/// Interface coordinates; which fields are populated depends on the title
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Context {
    #[serde(default, rename = "intf_id", deserialize_with = "label")]
    pub interface_id: String,
    #[serde(default, deserialize_with = "label")]
    pub pon_id: String,
    #[serde(default, rename = "port_no", deserialize_with = "label")]
    pub port_number: String,
    #[serde(default, deserialize_with = "label")]
    pub upstream: String,
}

impl Context {
    pub fn is_upstream(&self) -> bool {
        self.upstream == "True"
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SliceMetrics {
    #[serde(default, deserialize_with = "reading")]
    pub tx_bytes: f64,
    #[serde(default, deserialize_with = "reading")]
    pub rx_bytes: f64,
    #[serde(default, deserialize_with = "reading")]
    pub tx_packets: f64,
    #[serde(default, deserialize_with = "reading")]
    pub rx_packets: f64,
    #[serde(default, deserialize_with = "reading")]
    pub tx_error_packets: f64,
    #[serde(default, deserialize_with = "reading")]
    pub rx_error_packets: f64,
    /// Interval packet count (bridge port history)
    #[serde(default, deserialize_with = "reading")]
    pub packets: f64,
    /// Interval octet count (bridge port history)
    #[serde(default, deserialize_with = "reading")]
    pub octets: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_slice() {
        let payload = br#"{
            "type": "slice",
            "ts": 1526318561.0,
            "slice_data": [{
                "metadata": {
                    "title": "Ethernet",
                    "logical_device_id": "0001c4c5ea6e7b55",
                    "serial_no": "BBSM00000001",
                    "device_id": "0001a7a8b7f4e7aa",
                    "ts": 1526318561.0,
                    "context": {"intf_id": "1", "pon_id": "0", "port_no": "128"}
                },
                "metrics": {
                    "tx_bytes": 1200.0, "rx_bytes": 800,
                    "tx_packets": 12, "rx_packets": 8,
                    "tx_error_packets": 1, "rx_error_packets": 0
                }
            }]
        }"#;

        let kpi = VolthaKpi::decode(payload).unwrap();
        assert_eq!(kpi.kind, "slice");
        assert_eq!(kpi.slice_data.len(), 1);

        let slice = &kpi.slice_data[0];
        assert_eq!(slice.metadata.title, "Ethernet");
        assert_eq!(slice.metadata.serial_number, "BBSM00000001");
        assert_eq!(slice.metadata.context.interface_id, "1");
        assert_eq!(slice.metadata.context.pon_id, "0");
        assert_eq!(slice.metadata.context.port_number, "128");
        assert_eq!(slice.metrics.tx_bytes, 1200.0);
        assert_eq!(slice.metrics.rx_bytes, 800.0);
        assert_eq!(slice.metrics.packets, 0.0);
    }

    #[test]
    fn test_upstream_flag() {
        let payload = br#"{"slice_data": [
            {"metadata": {"title": "Ethernet_Bridge_Port_History", "context": {"upstream": "True"}}},
            {"metadata": {"title": "Ethernet_Bridge_Port_History", "context": {"upstream": "False"}}},
            {"metadata": {"title": "Ethernet_Bridge_Port_History", "context": {"upstream": "true"}}}
        ]}"#;

        let kpi = VolthaKpi::decode(payload).unwrap();
        let upstream: Vec<bool> = kpi
            .slice_data
            .iter()
            .map(|s| s.metadata.context.is_upstream())
            .collect();
        assert_eq!(upstream, vec![true, false, false]);
    }

    #[test]
    fn test_decode_empty_object() {
        let kpi = VolthaKpi::decode(b"{}").unwrap();
        assert!(kpi.slice_data.is_empty());
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        assert!(VolthaKpi::decode(br#"{"slice_data": {"metadata": {}}}"#).is_err());
        assert!(VolthaKpi::decode(br#"{"slice_data": [{"metrics": {"tx_bytes": "x"}}]}"#).is_err());
        assert!(VolthaKpi::decode(b"not json").is_err());
    }

    #[test]
    fn test_decode_rejects_non_string_labels() {
        let numeric_pon = br#"{"slice_data": [{"metadata": {"title": "PON", "context": {"pon_id": 0}}}]}"#;
        assert!(VolthaKpi::decode(numeric_pon).is_err());

        let bool_upstream = br#"{"slice_data": [{"metadata": {"context": {"upstream": true}}}]}"#;
        assert!(VolthaKpi::decode(bool_upstream).is_err());
    }
}
