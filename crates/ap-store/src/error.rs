// error.rs — Error types for the persistence boundary.
//
// Uses `thiserror` to derive the standard Rust `Error` trait automatically.
// `ErrorKind` is the shared taxonomy every Appraise crate maps its own
// errors onto, so callers can decide between "re-prompt", "show message"
// and "offer manual retry" without matching on each crate's enum.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification shared by all Appraise error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User-correctable input problem; nothing was written.
    ValidationFailed,
    /// Write attempted against a record in its terminal state.
    AlreadySubmitted,
    /// Optimistic-concurrency miss while resolving an approval.
    NotPending,
    /// Transport or storage failure. The only kind worth a manual retry.
    GatewayUnavailable,
    /// The request conflicts with current state in some other way.
    Conflict,
    /// A referenced actor or relationship does not exist.
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ValidationFailed => write!(f, "validation_failed"),
            ErrorKind::AlreadySubmitted => write!(f, "already_submitted"),
            ErrorKind::NotPending => write!(f, "not_pending"),
            ErrorKind::GatewayUnavailable => write!(f, "gateway_unavailable"),
            ErrorKind::Conflict => write!(f, "conflict"),
            ErrorKind::NotFound => write!(f, "not_found"),
        }
    }
}

/// Errors that can occur at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("persistence gateway unavailable: {0}")]
    Unavailable(String),

    /// A file operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A row could not be serialized or a stored row is malformed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The actor directory has no entry for this id.
    #[error("actor not found: {0}")]
    ActorNotFound(String),

    /// A key would escape the store layout (path separators, "..").
    #[error("invalid key '{0}'")]
    InvalidKey(String),
}

impl StoreError {
    /// Map onto the shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::ActorNotFound(_) => ErrorKind::NotFound,
            StoreError::InvalidKey(_) => ErrorKind::ValidationFailed,
            StoreError::Unavailable(_) | StoreError::Io { .. } | StoreError::Serialization(_) => {
                ErrorKind::GatewayUnavailable
            }
        }
    }
}
