// error.rs — Error types for the score cache.

use ap_store::{Category, ErrorKind, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    /// `update` was called before any actor was loaded.
    #[error("score cache is empty; call ensure_loaded first")]
    NotLoaded,

    /// A score was NaN or infinite.
    #[error("invalid {category} score: current {current}, target {target}")]
    InvalidValue {
        category: Category,
        current: f64,
        target: f64,
    },

    #[error("gateway unavailable: {0}")]
    GatewayUnavailable(#[from] StoreError),
}

impl ScoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScoreError::NotLoaded => ErrorKind::NotFound,
            ScoreError::InvalidValue { .. } => ErrorKind::ValidationFailed,
            ScoreError::GatewayUnavailable(e) => e.kind(),
        }
    }
}
