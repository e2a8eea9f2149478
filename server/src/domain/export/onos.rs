//! ONOS port statistics mapping
//!
//! Every port of every record overwrites six series keyed by
//! `(device_id, port_id)`.

use super::dispatcher::KpiMapper;
use crate::data::kpi::OnosKpi;
use crate::data::metrics::{MetricRegistry, RegistryError, SeriesHandle};

pub const ONOS_LABELS: [&str; 2] = ["device_id", "port_id"];

pub struct OnosMapper {
    tx_bytes: SeriesHandle,
    rx_bytes: SeriesHandle,
    tx_packets: SeriesHandle,
    rx_packets: SeriesHandle,
    tx_drop_packets: SeriesHandle,
    rx_drop_packets: SeriesHandle,
}

impl OnosMapper {
    pub fn register(registry: &MetricRegistry) -> Result<Self, RegistryError> {
        let gauge = |name: &str, help: &str| registry.register(name, help, &ONOS_LABELS);

        Ok(Self {
            tx_bytes: gauge("onos_tx_bytes_total", "Number of total bytes transmitted")?,
            rx_bytes: gauge("onos_rx_bytes_total", "Number of total bytes received")?,
            tx_packets: gauge("onos_tx_packets_total", "Number of total packets transmitted")?,
            rx_packets: gauge("onos_rx_packets_total", "Number of total packets received")?,
            tx_drop_packets: gauge(
                "onos_tx_drop_packets_total",
                "Number of total transmitted packets dropped",
            )?,
            rx_drop_packets: gauge(
                "onos_rx_drop_packets_total",
                "Number of total received packets dropped",
            )?,
        })
    }
}

impl KpiMapper for OnosMapper {
    type Record = OnosKpi;

    fn map(&self, record: &OnosKpi) -> Result<(), RegistryError> {
        for port in &record.ports {
            let labels = [record.device_id.as_str(), port.port_id.as_str()];
            self.tx_bytes.set(&labels, port.tx_bytes)?;
            self.rx_bytes.set(&labels, port.rx_bytes)?;
            self.tx_packets.set(&labels, port.tx_packets)?;
            self.rx_packets.set(&labels, port.rx_packets)?;
            self.tx_drop_packets.set(&labels, port.tx_packets_drop)?;
            self.rx_drop_packets.set(&labels, port.rx_packets_drop)?;
        }
        Ok(())
    }
}
