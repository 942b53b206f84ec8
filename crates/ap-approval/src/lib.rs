//! # ap-approval
//!
//! Onboarding submissions and the reviewer's approval queue.
//!
//! A subject submits their GSP and Focus 30 once onboarding starts; that
//! appends a `Pending` [`ApprovalRequest`](ap_store::ApprovalRequest) for
//! their reviewer. The reviewer resolves it (one at a time or in bulk) by
//! appending an `Approved` or `Rejected` copy. A rejected subject may
//! resubmit, which appends a fresh `Pending` row.
//!
//! ## Consistency
//!
//! `resolve` re-reads the subject's latest row and refuses with `NotPending`
//! if it is no longer pending. That read-then-append is the only
//! cross-session guard. It is best effort, not linearizable: two reviewers
//! racing on one subject can both succeed, leaving a superseded row.
//!
//! ## Key components
//!
//! - [`ApprovalQueue`] — `pending`, `resolve`, `resolve_bulk`, subject status
//! - [`Onboarding`] — password-change flag and (re)submission
//! - [`BulkOutcome`] — aggregate counts plus per-item failures

pub mod error;
pub mod onboarding;
pub mod queue;

pub use error::ApprovalError;
pub use onboarding::Onboarding;
pub use queue::{ApprovalQueue, BulkFailure, BulkOutcome, Decision};
