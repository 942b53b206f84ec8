// record.rs — Rows stored by the persistence gateway.
//
// Goal records, approval requests and score rows are append-only: a save
// writes a new row, it never edits one. Actor rows are the exception; their
// two flags are flipped in place by the password-change and onboarding
// operations and are otherwise read-only to this core.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque category payload. The core only looks at which fields are empty.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// An employee using the system ("subject" when under review).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub display_name: String,
    /// Set once the initial password has been replaced.
    #[serde(default)]
    pub password_changed: bool,
    /// Set once the onboarding (GSP / Focus 30) submission has been made.
    #[serde(default)]
    pub onboarding_complete: bool,
}

impl Actor {
    /// A freshly provisioned actor: both onboarding flags unset.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            password_changed: false,
            onboarding_complete: false,
        }
    }
}

/// The five functional goal-tracking areas. Each has its own record stream
/// but all share the same lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Business,
    People,
    Collaboration,
    Quality,
    Industry,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Business,
        Category::People,
        Category::Collaboration,
        Category::Quality,
        Category::Industry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Business => "business",
            Category::People => "people",
            Category::Collaboration => "collaboration",
            Category::Quality => "quality",
            Category::Industry => "industry",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Lifecycle status of a goal record: Draft → InProgress → Submitted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Draft,
    InProgress,
    Submitted,
}

impl GoalStatus {
    /// Submitted is terminal for the normal edit path.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GoalStatus::Submitted)
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalStatus::Draft => write!(f, "draft"),
            GoalStatus::InProgress => write!(f, "in_progress"),
            GoalStatus::Submitted => write!(f, "submitted"),
        }
    }
}

/// One row of a category's goal stream for one actor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalRecord {
    /// Row id. `None` only for the synthetic Draft returned when nothing
    /// has been saved yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Uuid>,
    pub actor_id: String,
    pub category: Category,
    #[serde(default)]
    pub payload: Payload,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
}

impl GoalRecord {
    /// A new row ready to append.
    pub fn new(
        actor_id: impl Into<String>,
        category: Category,
        payload: Payload,
        status: GoalStatus,
    ) -> Self {
        Self {
            record_id: Some(Uuid::new_v4()),
            actor_id: actor_id.into(),
            category,
            payload,
            status,
            created_at: Utc::now(),
        }
    }

    /// The synthetic empty Draft that stands in for "no row yet".
    pub fn draft(actor_id: impl Into<String>, category: Category) -> Self {
        Self {
            record_id: None,
            actor_id: actor_id.into(),
            category,
            payload: Payload::new(),
            status: GoalStatus::Draft,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Whether this row exists in the store.
    pub fn is_persisted(&self) -> bool {
        self.record_id.is_some()
    }
}

/// The two free-text fields of an onboarding submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OnboardingContent {
    pub gsp: String,
    pub focus30: String,
}

/// Status of an approval request row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// One row of a subject's approval history. The latest row is the current
/// status; a decision is recorded by appending a copy with the new status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApprovalRequest {
    pub request_id: Uuid,
    pub subject_id: String,
    pub reviewer_id: String,
    pub content: OnboardingContent,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

impl ApprovalRequest {
    /// A new Pending request from `subject_id` to `reviewer_id`.
    pub fn pending(
        subject_id: impl Into<String>,
        reviewer_id: impl Into<String>,
        content: OnboardingContent,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            subject_id: subject_id.into(),
            reviewer_id: reviewer_id.into(),
            content,
            status: ApprovalStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// The row that records `decision` on top of this one.
    ///
    /// Stamped no earlier than this row so it always supersedes it.
    pub fn decided(&self, decision: ApprovalStatus) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            subject_id: self.subject_id.clone(),
            reviewer_id: self.reviewer_id.clone(),
            content: self.content.clone(),
            status: decision,
            created_at: Utc::now().max(self.created_at),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }
}

/// Aggregated score for one category of one actor. Derived data; the cache
/// built from it is never a source of truth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceScore {
    pub score_id: Uuid,
    pub actor_id: String,
    pub category: Category,
    pub current_score: f64,
    pub target_score: f64,
    pub max_score: f64,
    pub created_at: DateTime<Utc>,
}

impl PerformanceScore {
    pub fn new(
        actor_id: impl Into<String>,
        category: Category,
        current_score: f64,
        target_score: f64,
        max_score: f64,
    ) -> Self {
        Self {
            score_id: Uuid::new_v4(),
            actor_id: actor_id.into(),
            category,
            current_score,
            target_score,
            max_score,
            created_at: Utc::now(),
        }
    }
}
