// error.rs — Error types for notification sinks.

use thiserror::Error;

/// Errors a notification sink can report. The dispatcher logs them and
/// carries on with the remaining sinks.
#[derive(Debug, Error)]
pub enum EventError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize an event.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Any other delivery failure (webhook, mail relay...).
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}
