//! Topic error types

use std::fmt;

/// Error type for envelope bus operations
#[derive(Debug)]
pub enum TopicError {
    /// Subscriber dropped
    ChannelClosed,
    /// Buffer full (backpressure)
    BufferFull,
    /// Configuration error
    Config(String),
}

impl std::error::Error for TopicError {}

impl fmt::Display for TopicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicError::ChannelClosed => write!(f, "channel closed"),
            TopicError::BufferFull => write!(f, "buffer full"),
            TopicError::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl<T> From<tokio::sync::mpsc::error::TrySendError<T>> for TopicError {
    fn from(err: tokio::sync::mpsc::error::TrySendError<T>) -> Self {
        match err {
            tokio::sync::mpsc::error::TrySendError::Full(_) => TopicError::BufferFull,
            tokio::sync::mpsc::error::TrySendError::Closed(_) => TopicError::ChannelClosed,
        }
    }
}
