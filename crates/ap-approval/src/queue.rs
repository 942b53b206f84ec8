// queue.rs — ApprovalQueue: what a reviewer still has to decide, and how
// decisions are recorded.
//
// Nothing here mutates a row. A decision is a new row copying the pending
// request with the new status; the subject's latest row is their status.
//
// Bulk resolution fans out one spawned task per subject. Dispatched tasks
// are detached from the caller: if the caller stops awaiting, every resolve
// still runs to completion. Partial failure is reported as data, never
// raised.

use std::fmt;
use std::sync::Arc;

use ap_events::{ApEvent, EventDispatcher};
use ap_store::{ApprovalRequest, ApprovalStatus, PersistenceGateway};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ApprovalError;

/// A reviewer's verdict. Pending is not a decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for ApprovalStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => ApprovalStatus::Approved,
            Decision::Rejected => ApprovalStatus::Rejected,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ApprovalStatus::from(*self).fmt(f)
    }
}

/// One subject a bulk resolution could not resolve. Left exactly as it was.
#[derive(Debug)]
pub struct BulkFailure {
    pub subject_id: String,
    pub error: ApprovalError,
}

/// Aggregate result of [`ApprovalQueue::resolve_bulk`].
///
/// `approved_count` counts successful resolutions with the requested
/// decision, whichever decision that was.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub approved_count: usize,
    pub failed_count: usize,
    /// Per-item failures, in the order the subjects were given.
    pub failures: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn is_complete_success(&self) -> bool {
        self.failed_count == 0
    }

    /// Subjects that were not resolved, for a caller-driven retry.
    pub fn failed_subjects(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.subject_id.as_str()).collect()
    }
}

impl fmt::Display for BulkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed",
            self.approved_count, self.failed_count
        )
    }
}

/// Pending approvals for a reviewer's subjects, and their resolution.
///
/// Cheap to clone: both fields are shared handles.
#[derive(Clone)]
pub struct ApprovalQueue {
    gateway: Arc<dyn PersistenceGateway>,
    events: Option<Arc<EventDispatcher>>,
}

impl ApprovalQueue {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            gateway,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Arc<EventDispatcher>) -> Self {
        self.events = Some(events);
        self
    }

    /// Every subject of `reviewer_id` whose latest request is Pending, in
    /// discovery order.
    pub async fn pending(&self, reviewer_id: &str) -> Result<Vec<ApprovalRequest>, ApprovalError> {
        let latest = self
            .gateway
            .latest_approvals_for_reviewer(reviewer_id)
            .await?;
        let pending: Vec<ApprovalRequest> = latest.into_iter().filter(|r| r.is_pending()).collect();
        tracing::debug!(reviewer_id, count = pending.len(), "pending approvals");
        Ok(pending)
    }

    /// The subject's latest request, whatever its status.
    pub async fn status(&self, subject_id: &str) -> Result<Option<ApprovalRequest>, ApprovalError> {
        Ok(self.gateway.latest_approval(subject_id).await?)
    }

    /// The latest request if it is a rejection; backs the subject's
    /// "please resubmit" banner.
    pub async fn rejection_notice(
        &self,
        subject_id: &str,
    ) -> Result<Option<ApprovalRequest>, ApprovalError> {
        Ok(self
            .status(subject_id)
            .await?
            .filter(|r| r.status == ApprovalStatus::Rejected))
    }

    /// Record `decision` for the subject's pending request.
    ///
    /// Fails with `NotPending` if the latest row is no longer Pending. That
    /// is a concurrency miss, not something to retry.
    pub async fn resolve(
        &self,
        subject_id: &str,
        decision: Decision,
        reviewer_id: &str,
    ) -> Result<ApprovalRequest, ApprovalError> {
        let latest = self.gateway.latest_approval(subject_id).await?;
        let pending = match latest {
            Some(req) if req.is_pending() => req,
            other => {
                return Err(ApprovalError::NotPending {
                    subject_id: subject_id.to_string(),
                    latest: other.map(|r| r.status),
                })
            }
        };
        if pending.reviewer_id != reviewer_id {
            return Err(ApprovalError::WrongReviewer {
                subject_id: subject_id.to_string(),
                reviewer_id: reviewer_id.to_string(),
                assigned_to: pending.reviewer_id,
            });
        }

        let resolved = pending.decided(decision.into());
        self.gateway.append_approval(&resolved).await?;

        tracing::info!(subject_id, reviewer_id, %decision, "approval resolved");
        if let Some(events) = &self.events {
            events.dispatch(&ApEvent::approval_resolved(
                subject_id,
                reviewer_id,
                resolved.status,
            ));
        }
        Ok(resolved)
    }

    /// Resolve every subject concurrently and aggregate the outcome.
    ///
    /// Successes are never rolled back and failures are never retried; the
    /// caller decides what to do with `failures`. Duplicate ids are resolved
    /// once. Must be called from within a tokio runtime.
    pub async fn resolve_bulk<I, S>(
        &self,
        subject_ids: I,
        decision: Decision,
        reviewer_id: &str,
    ) -> BulkOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut subjects: Vec<String> = Vec::new();
        for id in subject_ids {
            let id = id.into();
            if !subjects.contains(&id) {
                subjects.push(id);
            }
        }

        // Spawn everything first so the resolves run concurrently; the
        // handles are awaited in input order only to keep reporting stable.
        let handles: Vec<_> = subjects
            .iter()
            .map(|subject_id| {
                let queue = self.clone();
                let subject_id = subject_id.clone();
                let reviewer_id = reviewer_id.to_string();
                tokio::spawn(async move {
                    queue.resolve(&subject_id, decision, &reviewer_id).await
                })
            })
            .collect();

        let mut outcome = BulkOutcome::default();
        for (subject_id, handle) in subjects.into_iter().zip(handles) {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(ApprovalError::TaskFailed {
                    subject_id: subject_id.clone(),
                    reason: e.to_string(),
                }),
            };
            match result {
                Ok(_) => outcome.approved_count += 1,
                Err(error) => {
                    tracing::debug!(subject_id = %subject_id, %error, "bulk item failed");
                    outcome.failed_count += 1;
                    outcome.failures.push(BulkFailure { subject_id, error });
                }
            }
        }

        if outcome.is_complete_success() {
            tracing::info!(reviewer_id, %decision, %outcome, "bulk resolution complete");
        } else {
            tracing::warn!(reviewer_id, %decision, %outcome, "bulk resolution partially failed");
        }
        if let Some(events) = &self.events {
            events.dispatch(&ApEvent::BulkResolved {
                reviewer_id: reviewer_id.to_string(),
                decision: decision.into(),
                approved_count: outcome.approved_count,
                failed_count: outcome.failed_count,
                timestamp: Utc::now(),
            });
        }
        outcome
    }
}
