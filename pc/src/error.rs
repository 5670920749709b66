//! Channel error types

use thiserror::Error;

/// Errors raised by slot transports
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode slot content: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode channel message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Slot lock poisoned")]
    Poisoned,
}

impl ChannelError {
    /// Whether the slot held something other than a channel message
    pub fn is_decode(&self) -> bool {
        matches!(self, ChannelError::Decode(_))
    }
}
