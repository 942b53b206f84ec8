// gateway.rs — The persistence boundary consumed by every other crate.
//
// Two traits, because they model two different external systems:
//
// - `PersistenceGateway` is the append-only row store. Inserts only; reads
//   are "latest row for key" queries. No in-process locking happens around
//   it; concurrent writers can at worst produce a superseded row.
// - `ActorDirectory` is the account/org system: the two onboarding flags and
//   the reviewer lookup (org hierarchy), which this core does not model.
//
// Every method is a suspension point, hence `async_trait`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::{Actor, ApprovalRequest, Category, GoalRecord, PerformanceScore};

/// Append-only store for goal records, approval requests and scores.
///
/// Implementations must be `Send + Sync` so a single gateway can be shared
/// (behind an `Arc`) by the lifecycle, the queue, the score cache and any
/// spawned bulk-resolution tasks.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Insert a goal row and return its row id. A row without an id (the
    /// synthetic Draft) is assigned a fresh one.
    async fn append_goal(&self, record: &GoalRecord) -> Result<Uuid, StoreError>;

    /// Latest goal row for `(actor_id, category)`, if any.
    async fn latest_goal(
        &self,
        actor_id: &str,
        category: Category,
    ) -> Result<Option<GoalRecord>, StoreError>;

    /// Every goal row for `(actor_id, category)`, oldest first.
    async fn goal_history(
        &self,
        actor_id: &str,
        category: Category,
    ) -> Result<Vec<GoalRecord>, StoreError>;

    /// Insert an approval row and return its row id.
    async fn append_approval(&self, request: &ApprovalRequest) -> Result<Uuid, StoreError>;

    /// Latest approval row for a subject, if any.
    async fn latest_approval(&self, subject_id: &str)
        -> Result<Option<ApprovalRequest>, StoreError>;

    /// For every subject, their latest approval row, kept only when that row
    /// is addressed to `reviewer_id`. Ordered by first appearance of each
    /// subject in the log.
    async fn latest_approvals_for_reviewer(
        &self,
        reviewer_id: &str,
    ) -> Result<Vec<ApprovalRequest>, StoreError>;

    /// Insert a score row and return its row id.
    async fn append_score(&self, score: &PerformanceScore) -> Result<Uuid, StoreError>;

    /// Latest score row per category for an actor.
    async fn latest_scores(&self, actor_id: &str) -> Result<Vec<PerformanceScore>, StoreError>;
}

/// Actor accounts and the org-hierarchy lookup.
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    /// Look up an actor. `Ok(None)` when unknown.
    async fn actor(&self, actor_id: &str) -> Result<Option<Actor>, StoreError>;

    /// Create or replace an actor together with their reviewer.
    async fn upsert(&self, actor: Actor, reviewer_id: Option<String>) -> Result<(), StoreError>;

    /// Flip `password_changed` to true and return the updated actor.
    async fn set_password_changed(&self, actor_id: &str) -> Result<Actor, StoreError>;

    /// Flip `onboarding_complete` to true and return the updated actor.
    async fn set_onboarding_complete(&self, actor_id: &str) -> Result<Actor, StoreError>;

    /// The reviewer responsible for `subject_id`, if the hierarchy has one.
    async fn reviewer_of(&self, subject_id: &str) -> Result<Option<String>, StoreError>;
}
