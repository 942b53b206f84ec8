// error.rs — Error types for onboarding and approval resolution.

use ap_store::{ApprovalStatus, ErrorKind, StoreError};
use thiserror::Error;

/// Errors from onboarding submission and approval resolution.
///
/// Everything except `GatewayUnavailable` and `TaskFailed` is an expected
/// business outcome: no row was written and retrying will not help.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// Submission content has empty fields.
    #[error("onboarding submission is missing: {}", .missing_fields.join(", "))]
    ValidationFailed { missing_fields: Vec<String> },

    /// The subject's latest request is not pending (already resolved, or
    /// never submitted).
    #[error("no pending request for {subject_id} (latest: {})", latest_label(.latest))]
    NotPending {
        subject_id: String,
        latest: Option<ApprovalStatus>,
    },

    /// The pending request belongs to a different reviewer.
    #[error("{reviewer_id} cannot resolve {subject_id}; request is assigned to {assigned_to}")]
    WrongReviewer {
        subject_id: String,
        reviewer_id: String,
        assigned_to: String,
    },

    /// The subject already has a request awaiting review.
    #[error("{subject_id} already has a pending request")]
    AlreadyPending { subject_id: String },

    /// The subject's onboarding has already been approved.
    #[error("{subject_id} is already approved")]
    AlreadyApproved { subject_id: String },

    /// The subject is not in the actor directory.
    #[error("actor not found: {0}")]
    ActorNotFound(String),

    /// The org hierarchy has no reviewer for this subject.
    #[error("no reviewer assigned to {0}")]
    NoReviewer(String),

    /// A dispatched bulk resolution did not report back.
    #[error("resolution task for {subject_id} failed: {reason}")]
    TaskFailed { subject_id: String, reason: String },

    /// The gateway or actor directory failed.
    #[error("gateway unavailable: {0}")]
    GatewayUnavailable(#[from] StoreError),
}

fn latest_label(latest: &Option<ApprovalStatus>) -> String {
    latest
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl ApprovalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApprovalError::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            ApprovalError::NotPending { .. } | ApprovalError::WrongReviewer { .. } => {
                ErrorKind::NotPending
            }
            ApprovalError::AlreadyPending { .. } | ApprovalError::AlreadyApproved { .. } => {
                ErrorKind::Conflict
            }
            ApprovalError::ActorNotFound(_) | ApprovalError::NoReviewer(_) => ErrorKind::NotFound,
            ApprovalError::TaskFailed { .. } => ErrorKind::GatewayUnavailable,
            // ActorNotFound from the directory stays NotFound.
            ApprovalError::GatewayUnavailable(e) => e.kind(),
        }
    }
}
