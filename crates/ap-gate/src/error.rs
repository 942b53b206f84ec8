// error.rs — Error types for gate configuration.
//
// Evaluation itself never fails: lookup errors fail closed inside the gate.

use ap_store::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("invalid public pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("gate surface '{0}' must be an absolute path")]
    InvalidSurface(String),
}

impl GateError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ValidationFailed
    }
}
