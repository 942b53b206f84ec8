// events.rs — Event model and notification dispatch.
//
// Appraise emits events at the points where the append log changes:
//   Goals:      goal_saved, goal_submitted
//   Onboarding: password_changed, approval_requested
//   Approvals:  approval_resolved, bulk_resolved
//
// The dispatcher is synchronous; sinks that talk to slow media should hand
// events off to their own task.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ap_store::{ApprovalStatus, Category, GoalStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EventError;

/// Events emitted by Appraise at lifecycle points.
///
/// The `#[serde(tag = "event_type")]` attribute makes each variant serialize
/// as `{"event_type": "goal_saved", ...}`, one self-describing JSON object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ApEvent {
    /// A goal row was appended with status Draft or InProgress.
    GoalSaved {
        actor_id: String,
        category: Category,
        record_id: Uuid,
        status: GoalStatus,
        timestamp: DateTime<Utc>,
    },

    /// A goal row was appended with status Submitted.
    GoalSubmitted {
        actor_id: String,
        category: Category,
        record_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// The actor replaced their initial password.
    PasswordChanged {
        actor_id: String,
        timestamp: DateTime<Utc>,
    },

    /// An onboarding submission (or resubmission) is waiting for review.
    ApprovalRequested {
        subject_id: String,
        reviewer_id: String,
        request_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A reviewer approved or rejected a submission.
    ApprovalResolved {
        subject_id: String,
        reviewer_id: String,
        decision: ApprovalStatus,
        timestamp: DateTime<Utc>,
    },

    /// A bulk resolution finished; partial failure is normal.
    BulkResolved {
        reviewer_id: String,
        decision: ApprovalStatus,
        approved_count: usize,
        failed_count: usize,
        timestamp: DateTime<Utc>,
    },
}

impl ApEvent {
    /// Get the event type name as a string.
    pub fn event_type(&self) -> &str {
        match self {
            ApEvent::GoalSaved { .. } => "goal_saved",
            ApEvent::GoalSubmitted { .. } => "goal_submitted",
            ApEvent::PasswordChanged { .. } => "password_changed",
            ApEvent::ApprovalRequested { .. } => "approval_requested",
            ApEvent::ApprovalResolved { .. } => "approval_resolved",
            ApEvent::BulkResolved { .. } => "bulk_resolved",
        }
    }

    /// Who the event is addressed to: the goal owner, the reviewer who has
    /// work waiting, or the subject whose submission was decided.
    pub fn recipient(&self) -> &str {
        match self {
            ApEvent::GoalSaved { actor_id, .. }
            | ApEvent::GoalSubmitted { actor_id, .. }
            | ApEvent::PasswordChanged { actor_id, .. } => actor_id,
            ApEvent::ApprovalRequested { reviewer_id, .. }
            | ApEvent::BulkResolved { reviewer_id, .. } => reviewer_id,
            ApEvent::ApprovalResolved { subject_id, .. } => subject_id,
        }
    }

    /// GoalSaved or GoalSubmitted, depending on the row's status.
    pub fn goal_written(
        actor_id: &str,
        category: Category,
        record_id: Uuid,
        status: GoalStatus,
    ) -> Self {
        let timestamp = Utc::now();
        if status.is_terminal() {
            ApEvent::GoalSubmitted {
                actor_id: actor_id.to_string(),
                category,
                record_id,
                timestamp,
            }
        } else {
            ApEvent::GoalSaved {
                actor_id: actor_id.to_string(),
                category,
                record_id,
                status,
                timestamp,
            }
        }
    }

    pub fn approval_resolved(
        subject_id: &str,
        reviewer_id: &str,
        decision: ApprovalStatus,
    ) -> Self {
        ApEvent::ApprovalResolved {
            subject_id: subject_id.to_string(),
            reviewer_id: reviewer_id.to_string(),
            decision,
            timestamp: Utc::now(),
        }
    }
}

/// Somewhere a notification can be delivered: the event log, a mail relay,
/// the reviewer panel's inbox.
///
/// `Send + Sync` because bulk resolution dispatches from spawned tasks.
pub trait NotificationSink: Send + Sync {
    /// Short label used when a delivery failure is logged.
    fn name(&self) -> &str {
        "sink"
    }

    /// Deliver one event. A failure is logged by the dispatcher and never
    /// undoes the write that produced the event.
    fn send(&self, event: &ApEvent) -> Result<(), EventError>;
}

/// Appends every event to the project's `events.jsonl`.
///
/// Each event becomes exactly one line, written with a single `write_all`
/// under a lock so concurrent bulk tasks never interleave partial lines.
pub struct LogSink {
    path: PathBuf,
    append: Mutex<()>,
}

impl LogSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            append: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> EventError {
        EventError::IoError {
            path: path.display().to_string(),
            source,
        }
    }
}

impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "event-log"
    }

    fn send(&self, event: &ApEvent) -> Result<(), EventError> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        // A poisoned lock only means another append panicked; the file is
        // still line-aligned.
        let _guard = self.append.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .map_err(|e| self.io_error(&self.path, e))
    }
}

/// Fans each Appraise event out to every registered sink.
///
/// Delivery is best-effort: the goal or approval row is already written by
/// the time an event exists, so a failing sink is logged with the event's
/// recipient and the remaining sinks still run.
#[derive(Default)]
pub struct EventDispatcher {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    /// Builder form of [`add_sink`](Self::add_sink).
    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Deliver `event` to every sink; returns how many sinks rejected it.
    pub fn dispatch(&self, event: &ApEvent) -> usize {
        let mut failed = 0;
        for sink in &self.sinks {
            if let Err(e) = sink.send(event) {
                failed += 1;
                tracing::warn!(
                    sink = sink.name(),
                    event = event.event_type(),
                    recipient = event.recipient(),
                    "notification not delivered: {}",
                    e
                );
            }
        }
        failed
    }
}
