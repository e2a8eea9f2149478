//! Export Pipeline
//!
//! Single consumer of the envelope bus: pulls envelopes in delivery order and
//! feeds them through the export engine.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::dispatcher::ExportEngine;
use crate::data::topics::{Subscriber, TelemetryEnvelope};

pub struct ExportPipeline {
    engine: Arc<ExportEngine>,
}

impl ExportPipeline {
    pub fn new(engine: Arc<ExportEngine>) -> Self {
        Self { engine }
    }

    pub fn start(
        self,
        mut subscriber: Subscriber,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::debug!("ExportPipeline received shutdown, draining...");
                            break;
                        }
                    }
                    envelope = subscriber.recv() => {
                        match envelope {
                            Some(envelope) => self.run(&envelope),
                            None => break,
                        }
                    }
                }
            }

            // Drain what was already accepted before shutdown
            let mut drained = 0usize;
            while let Some(envelope) = subscriber.try_recv() {
                self.run(&envelope);
                drained += 1;
            }
            tracing::debug!(drained, "ExportPipeline shutdown complete");
        })
    }

    fn run(&self, envelope: &TelemetryEnvelope) {
        // Failures are logged and counted by the engine; the loop moves on
        let _ = self.engine.export(&envelope.topic, &envelope.payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::metrics::MetricRegistry;
    use crate::data::topics::{TopicConfig, envelope_bus};

    const BRIDGE_UPSTREAM: &str = r#"{"slice_data": [{
        "metadata": {"title": "Ethernet_Bridge_Port_History", "logical_device_id": "ld",
                     "serial_no": "sn", "device_id": "dev", "context": {"upstream": "True"}},
        "metrics": {"packets": 2, "octets": 100}
    }]}"#;

    fn setup() -> (Arc<ExportEngine>, crate::data::topics::Publisher, Subscriber) {
        let registry = MetricRegistry::new();
        let engine = Arc::new(ExportEngine::new(&registry).unwrap());
        let (publisher, subscriber) = envelope_bus(&TopicConfig {
            channel_capacity: 64,
            buffer_bytes: 1024 * 1024,
        })
        .unwrap();
        (engine, publisher, subscriber)
    }

    #[tokio::test]
    async fn test_pipeline_survives_bad_envelopes() {
        let (engine, publisher, subscriber) = setup();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = ExportPipeline::new(engine.clone()).start(subscriber, shutdown_rx);

        publisher
            .publish(TelemetryEnvelope::new("voltha.kpis", "{oops"))
            .unwrap();
        publisher
            .publish(TelemetryEnvelope::new("nobody.kpis", "{}"))
            .unwrap();
        publisher
            .publish(TelemetryEnvelope::new("voltha.kpis", BRIDGE_UPSTREAM))
            .unwrap();
        drop(publisher);

        // bus closes once the publisher is gone and the queue is empty
        handle.await.unwrap();

        let messages = engine.stats().messages();
        assert_eq!(messages.get(&["voltha.kpis", "decode_error"]), None);
        assert_eq!(messages.get(&["voltha.kpis", "ok"]), Some(1.0));
        assert_eq!(messages.get(&["nobody.kpis", "ok"]), None);
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_envelopes() {
        let (engine, publisher, subscriber) = setup();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        for _ in 0..10 {
            publisher
                .publish(TelemetryEnvelope::new("voltha.kpis", BRIDGE_UPSTREAM))
                .unwrap();
        }
        // shutdown is already requested when the pipeline starts
        shutdown_tx.send(true).unwrap();

        let handle = ExportPipeline::new(engine.clone()).start(subscriber, shutdown_rx);
        handle.await.unwrap();

        assert_eq!(
            engine.stats().messages().get(&["voltha.kpis", "ok"]),
            Some(10.0)
        );
        assert_eq!(publisher.buffered_bytes(), 0);
    }
}
