//! Self-observability counters for the export engine

use crate::data::metrics::{CounterHandle, MetricRegistry, RegistryError};

pub const MESSAGES_TOTAL: &str = "topic_exporter_messages_total";
pub const UNKNOWN_TITLES_TOTAL: &str = "topic_exporter_unknown_titles_total";

#[derive(Clone)]
pub struct ExportStats {
    messages: CounterHandle,
    unknown_titles: CounterHandle,
}

impl ExportStats {
    pub fn register(registry: &MetricRegistry) -> Result<Self, RegistryError> {
        Ok(Self {
            messages: registry.register_counter(
                MESSAGES_TOTAL,
                "Number of KPI messages processed per topic and result",
                &["topic", "result"],
            )?,
            unknown_titles: registry.register_counter(
                UNKNOWN_TITLES_TOTAL,
                "Number of VOLTHA KPI slices dropped because their title has no mapping rule",
                &["title"],
            )?,
        })
    }

    /// Count one processed message; failures here are logged, never returned
    pub fn record_message(&self, topic: &str, result: &str) {
        if let Err(e) = self.messages.inc(&[topic, result]) {
            tracing::error!(error = %e, "Failed to record message counter");
        }
    }

    pub fn unknown_titles(&self) -> &CounterHandle {
        &self.unknown_titles
    }

    pub fn messages(&self) -> &CounterHandle {
        &self.messages
    }
}
