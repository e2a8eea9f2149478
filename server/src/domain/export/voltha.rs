//! VOLTHA KPI mapping
//!
//! Each slice is routed through a closed title table. A rule fixes three
//! things for its title: which labels identify the series, whether values
//! overwrite (`set`, absolute device counters) or accumulate (`add`,
//! interval deltas), and which fields feed which series.
//!
//! | Title | Labels | Mode |
//! |-------|--------|------|
//! | `Ethernet`, `PON`, `FEC_History` | full interface context | set |
//! | `Ethernet_Bridge_Port_History` | device only, `NA` placeholders | add |
//! | `Ethernet_UNI_History`, `voltha.internal` | ignored | - |
//!
//! Titles outside the table are dropped with a warning and counted in
//! `topic_exporter_unknown_titles_total`. The counter's `title` label keeps at
//! most [`MAX_UNKNOWN_TITLES`] distinct values; malformed titles and anything
//! past that limit are counted as [`OTHER_TITLE`].

use std::collections::HashSet;

use parking_lot::Mutex;

use super::dispatcher::KpiMapper;
use crate::data::kpi::{SliceData, VolthaKpi};
use crate::data::metrics::{
    CounterHandle, MetricRegistry, RegistryError, SeriesHandle, UpdateMode,
};

pub const VOLTHA_LABELS: [&str; 7] = [
    "logical_device_id",
    "serial_number",
    "device_id",
    "interface_id",
    "pon_id",
    "port_number",
    "title",
];

/// Placeholder for interface coordinates a title does not carry
pub const NOT_APPLICABLE: &str = "NA";

/// Bucket for unknown titles that are malformed or over the limit
pub const OTHER_TITLE: &str = "other";

pub const MAX_UNKNOWN_TITLES: usize = 32;
const MAX_TITLE_LABEL_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelPolicy {
    /// Interface, PON and port taken from the slice context
    Interface,
    /// Interface, PON and port replaced by `NA`
    Device,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldSet {
    /// tx/rx bytes, packets and error packets
    InterfaceCounters,
    /// packets/octets routed to tx or rx by the upstream flag
    BridgePortTraffic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TitleRule {
    Export {
        labels: LabelPolicy,
        mode: UpdateMode,
        fields: FieldSet,
    },
    Ignore,
}

const INTERFACE_COUNTERS: TitleRule = TitleRule::Export {
    labels: LabelPolicy::Interface,
    mode: UpdateMode::Set,
    fields: FieldSet::InterfaceCounters,
};

const BRIDGE_PORT_HISTORY: TitleRule = TitleRule::Export {
    labels: LabelPolicy::Device,
    mode: UpdateMode::Add,
    fields: FieldSet::BridgePortTraffic,
};

const TITLE_RULES: &[(&str, TitleRule)] = &[
    ("Ethernet", INTERFACE_COUNTERS),
    ("PON", INTERFACE_COUNTERS),
    ("FEC_History", INTERFACE_COUNTERS),
    ("Ethernet_Bridge_Port_History", BRIDGE_PORT_HISTORY),
    // per-ONU UNI detail is not surfaced
    ("Ethernet_UNI_History", TitleRule::Ignore),
    // internal bookkeeping, not a KPI
    ("voltha.internal", TitleRule::Ignore),
];

fn rule_for(title: &str) -> Option<TitleRule> {
    TITLE_RULES
        .iter()
        .find(|(name, _)| *name == title)
        .map(|(_, rule)| *rule)
}

fn is_title_label(title: &str) -> bool {
    !title.is_empty()
        && title.len() <= MAX_TITLE_LABEL_LEN
        && title
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
}

pub struct VolthaMapper {
    tx_bytes: SeriesHandle,
    rx_bytes: SeriesHandle,
    tx_packets: SeriesHandle,
    rx_packets: SeriesHandle,
    tx_error_packets: SeriesHandle,
    rx_error_packets: SeriesHandle,
    unknown_titles: CounterHandle,
    seen_titles: Mutex<HashSet<String>>,
}

impl VolthaMapper {
    pub fn register(
        registry: &MetricRegistry,
        unknown_titles: CounterHandle,
    ) -> Result<Self, RegistryError> {
        let gauge = |name: &str, help: &str| registry.register(name, help, &VOLTHA_LABELS);

        Ok(Self {
            tx_bytes: gauge("voltha_tx_bytes_total", "Number of total bytes transmitted")?,
            rx_bytes: gauge("voltha_rx_bytes_total", "Number of total bytes received")?,
            tx_packets: gauge(
                "voltha_tx_packets_total",
                "Number of total packets transmitted",
            )?,
            rx_packets: gauge("voltha_rx_packets_total", "Number of total packets received")?,
            tx_error_packets: gauge(
                "voltha_tx_error_packets_total",
                "Number of total transmitted packets error",
            )?,
            rx_error_packets: gauge(
                "voltha_rx_error_packets_total",
                "Number of total received packets error",
            )?,
            unknown_titles,
            seen_titles: Mutex::new(HashSet::new()),
        })
    }

    /// Label value under which an unknown title is counted
    fn unknown_title_label<'a>(&self, title: &'a str) -> &'a str {
        if !is_title_label(title) {
            return OTHER_TITLE;
        }
        let mut seen = self.seen_titles.lock();
        if seen.contains(title) {
            return title;
        }
        if seen.len() < MAX_UNKNOWN_TITLES {
            seen.insert(title.to_string());
            return title;
        }
        OTHER_TITLE
    }

    fn export_slice(
        &self,
        slice: &SliceData,
        labels: LabelPolicy,
        mode: UpdateMode,
        fields: FieldSet,
    ) -> Result<(), RegistryError> {
        let meta = &slice.metadata;
        let ctx = &meta.context;
        let m = &slice.metrics;

        let label_values: [&str; 7] = match labels {
            LabelPolicy::Interface => [
                meta.logical_device_id.as_str(),
                meta.serial_number.as_str(),
                meta.device_id.as_str(),
                ctx.interface_id.as_str(),
                ctx.pon_id.as_str(),
                ctx.port_number.as_str(),
                meta.title.as_str(),
            ],
            LabelPolicy::Device => [
                meta.logical_device_id.as_str(),
                meta.serial_number.as_str(),
                meta.device_id.as_str(),
                NOT_APPLICABLE,
                NOT_APPLICABLE,
                NOT_APPLICABLE,
                meta.title.as_str(),
            ],
        };

        let updates: Vec<(&SeriesHandle, f64)> = match fields {
            FieldSet::InterfaceCounters => vec![
                (&self.tx_bytes, m.tx_bytes),
                (&self.rx_bytes, m.rx_bytes),
                (&self.tx_packets, m.tx_packets),
                (&self.rx_packets, m.rx_packets),
                (&self.tx_error_packets, m.tx_error_packets),
                (&self.rx_error_packets, m.rx_error_packets),
            ],
            FieldSet::BridgePortTraffic if ctx.is_upstream() => vec![
                (&self.tx_packets, m.packets),
                (&self.tx_bytes, m.octets),
            ],
            FieldSet::BridgePortTraffic => vec![
                (&self.rx_packets, m.packets),
                (&self.rx_bytes, m.octets),
            ],
        };

        for (series, value) in updates {
            series.update(mode, &label_values, value)?;
        }
        Ok(())
    }
}

impl KpiMapper for VolthaMapper {
    type Record = VolthaKpi;

    fn map(&self, record: &VolthaKpi) -> Result<(), RegistryError> {
        for slice in &record.slice_data {
            let title = slice.metadata.title.as_str();
            match rule_for(title) {
                Some(TitleRule::Export {
                    labels,
                    mode,
                    fields,
                }) => self.export_slice(slice, labels, mode, fields)?,
                Some(TitleRule::Ignore) => {
                    tracing::trace!(title, "Skipping VOLTHA slice");
                }
                None => {
                    tracing::warn!(
                        title,
                        device_id = %slice.metadata.device_id,
                        "Unknown VOLTHA KPI title, slice dropped"
                    );
                    self.unknown_titles
                        .inc(&[self.unknown_title_label(title)])?;
                }
            }
        }
        Ok(())
    }
}
