//! In-process envelope bus
//!
//! Carries `(topic, payload)` envelopes from the ingestion routes to the
//! export pipeline. A single bounded channel with one consumer keeps
//! envelopes in delivery order, which `add`-mode series rely on.
//!
//! Backpressure is applied twice: on queued message count (channel capacity)
//! and on queued payload bytes (byte budget reserved on publish, released on
//! receive).

mod error;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;

pub use error::TopicError;

/// A raw payload tagged with the topic it arrived on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEnvelope {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl TelemetryEnvelope {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Estimated in-memory size for the byte budget
    pub fn size_bytes(&self) -> usize {
        self.topic.len() + self.payload.len()
    }
}

/// Bus sizing
#[derive(Debug, Clone)]
pub struct TopicConfig {
    /// Maximum queued envelopes
    pub channel_capacity: usize,
    /// Maximum queued payload bytes
    pub buffer_bytes: usize,
}

/// Create a bus, returning its publisher and the single subscriber
pub fn envelope_bus(config: &TopicConfig) -> Result<(Publisher, Subscriber), TopicError> {
    if config.channel_capacity == 0 {
        return Err(TopicError::Config(
            "channel capacity must be greater than 0".into(),
        ));
    }
    if config.buffer_bytes == 0 {
        return Err(TopicError::Config(
            "buffer size must be greater than 0".into(),
        ));
    }

    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let buffered = Arc::new(AtomicUsize::new(0));

    let publisher = Publisher {
        tx,
        buffered: buffered.clone(),
        max_bytes: config.buffer_bytes,
    };
    let subscriber = Subscriber { rx, buffered };
    Ok((publisher, subscriber))
}

/// Publisher handle - clone and share across producers
#[derive(Clone, Debug)]
pub struct Publisher {
    tx: mpsc::Sender<TelemetryEnvelope>,
    buffered: Arc<AtomicUsize>,
    max_bytes: usize,
}

impl Publisher {
    /// Queue an envelope (returns error if the bus is full or closed)
    pub fn publish(&self, envelope: TelemetryEnvelope) -> Result<(), TopicError> {
        let size = envelope.size_bytes();

        // Atomic CAS to reserve buffer space
        loop {
            let current = self.buffered.load(Ordering::Relaxed);
            if current + size > self.max_bytes {
                return Err(TopicError::BufferFull);
            }
            if self
                .buffered
                .compare_exchange(current, current + size, Ordering::SeqCst, Ordering::Relaxed)
                .is_ok()
            {
                break;
            }
        }

        self.tx.try_send(envelope).map_err(|e| {
            self.buffered.fetch_sub(size, Ordering::SeqCst);
            TopicError::from(e)
        })
    }

    /// Bytes currently queued
    pub fn buffered_bytes(&self) -> usize {
        self.buffered.load(Ordering::Relaxed)
    }
}

/// Subscriber handle (single consumer)
pub struct Subscriber {
    rx: mpsc::Receiver<TelemetryEnvelope>,
    buffered: Arc<AtomicUsize>,
}

impl Subscriber {
    /// Wait for the next envelope; `None` once every publisher is dropped
    pub async fn recv(&mut self) -> Option<TelemetryEnvelope> {
        let envelope = self.rx.recv().await?;
        self.release(&envelope);
        Some(envelope)
    }

    /// Take an already-queued envelope without waiting
    pub fn try_recv(&mut self) -> Option<TelemetryEnvelope> {
        let envelope = self.rx.try_recv().ok()?;
        self.release(&envelope);
        Some(envelope)
    }

    fn release(&self, envelope: &TelemetryEnvelope) {
        self.buffered
            .fetch_sub(envelope.size_bytes(), Ordering::SeqCst);
    }
}
