//! Export engine error types

use thiserror::Error;

use crate::data::metrics::RegistryError;

/// Outcome of a failed `export` call
///
/// Every variant is recoverable: the caller logs it and moves on to the next
/// envelope.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unrecognized topic '{0}'")]
    UnrecognizedTopic(String),

    #[error("Failed to decode payload for topic '{topic}': {source}")]
    Decode {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to map record for topic '{topic}': {source}")]
    Mapping {
        topic: String,
        #[source]
        source: RegistryError,
    },
}

impl ExportError {
    pub fn topic(&self) -> &str {
        match self {
            ExportError::UnrecognizedTopic(topic) => topic,
            ExportError::Decode { topic, .. } => topic,
            ExportError::Mapping { topic, .. } => topic,
        }
    }

    /// Value of the `result` label on `topic_exporter_messages_total`
    pub fn result_label(&self) -> &'static str {
        match self {
            ExportError::UnrecognizedTopic(_) => "unrecognized",
            ExportError::Decode { .. } => "decode_error",
            ExportError::Mapping { .. } => "mapping_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_topic_display() {
        let err = ExportError::UnrecognizedTopic("foo.kpis".to_string());
        assert_eq!(err.to_string(), "Unrecognized topic 'foo.kpis'");
        assert_eq!(err.topic(), "foo.kpis");
        assert_eq!(err.result_label(), "unrecognized");
    }

    #[test]
    fn test_decode_error_keeps_cause() {
        let source = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let err = ExportError::Decode {
            topic: "onos.kpis".to_string(),
            source,
        };
        assert!(
            err.to_string()
                .starts_with("Failed to decode payload for topic 'onos.kpis': ")
        );
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.result_label(), "decode_error");
    }
}
