// error.rs — Error types for the goal lifecycle.

use ap_store::{Category, ErrorKind, StoreError};
use thiserror::Error;

/// Errors that can occur during goal lifecycle operations.
///
/// The first two are expected business outcomes and never involve a write.
#[derive(Debug, Error)]
pub enum GoalError {
    /// One or more required fields are empty. Nothing was written.
    #[error("{category} goal is missing required fields: {}", .missing_fields.join(", "))]
    ValidationFailed {
        category: Category,
        missing_fields: Vec<String>,
    },

    /// The current record is already Submitted.
    #[error("{category} goal for {actor_id} is already submitted")]
    AlreadySubmitted { actor_id: String, category: Category },

    /// The persistence gateway failed.
    #[error("gateway unavailable: {0}")]
    GatewayUnavailable(#[from] StoreError),
}

impl GoalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GoalError::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            GoalError::AlreadySubmitted { .. } => ErrorKind::AlreadySubmitted,
            GoalError::GatewayUnavailable(_) => ErrorKind::GatewayUnavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_fields() {
        let err = GoalError::ValidationFailed {
            category: Category::Business,
            missing_fields: vec!["objective".into(), "target".into()],
        };
        assert_eq!(
            err.to_string(),
            "business goal is missing required fields: objective, target"
        );
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }
}
