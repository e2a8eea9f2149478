//! ONOS port statistics records (`onos.kpis`)

use serde::Deserialize;

use super::KpiRecord;
use super::fields::{label, nullable, reading};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnosKpi {
    #[serde(default, deserialize_with = "label")]
    pub device_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub ports: Vec<PortStat>,
}

impl KpiRecord for OnosKpi {}

/// Counters for one switch port
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortStat {
    #[serde(default, rename = "portId", deserialize_with = "label")]
    pub port_id: String,
    #[serde(default, rename = "bytesTx", deserialize_with = "reading")]
    pub tx_bytes: f64,
    #[serde(default, rename = "bytesRx", deserialize_with = "reading")]
    pub rx_bytes: f64,
    #[serde(default, rename = "pktTx", deserialize_with = "reading")]
    pub tx_packets: f64,
    #[serde(default, rename = "pktRx", deserialize_with = "reading")]
    pub rx_packets: f64,
    #[serde(default, rename = "pktTxDrp", deserialize_with = "reading")]
    pub tx_packets_drop: f64,
    #[serde(default, rename = "pktRxDrp", deserialize_with = "reading")]
    pub rx_packets_drop: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ports() {
        let payload = br#"{
            "deviceId": "of:0000000000000001",
            "ports": [
                {"portId": "1", "pktRx": 10, "pktTx": 20, "bytesRx": 1000, "bytesTx": 2000,
                 "pktRxDrp": 1, "pktTxDrp": 2},
                {"portId": "2"}
            ]
        }"#;

        let kpi = OnosKpi::decode(payload).unwrap();
        assert_eq!(kpi.device_id, "of:0000000000000001");
        assert_eq!(kpi.ports.len(), 2);

        let first = &kpi.ports[0];
        assert_eq!(first.port_id, "1");
        assert_eq!(first.rx_packets, 10.0);
        assert_eq!(first.tx_packets, 20.0);
        assert_eq!(first.rx_bytes, 1000.0);
        assert_eq!(first.tx_bytes, 2000.0);
        assert_eq!(first.rx_packets_drop, 1.0);
        assert_eq!(first.tx_packets_drop, 2.0);

        assert_eq!(kpi.ports[1].port_id, "2");
        assert_eq!(kpi.ports[1].tx_bytes, 0.0);
    }

    #[test]
    fn test_decode_truncated_payload() {
        assert!(OnosKpi::decode(br#"{"deviceId": "of:1", "ports": [{"portId": "1""#).is_err());
    }

    #[test]
    fn test_decode_rejects_numeric_port_id() {
        assert!(OnosKpi::decode(br#"{"deviceId": "of:1", "ports": [{"portId": 2}]}"#).is_err());
    }
}
