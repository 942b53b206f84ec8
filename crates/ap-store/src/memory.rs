// memory.rs — In-process gateway: append-only Vecs behind an async RwLock.
//
// Used by tests and by embedders that keep state elsewhere. Semantics match
// the JSONL gateway exactly; both reduce rows through `crate::latest`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::gateway::{ActorDirectory, PersistenceGateway};
use crate::latest::{latest, latest_per_key};
use crate::record::{Actor, ApprovalRequest, Category, GoalRecord, PerformanceScore};

#[derive(Default)]
struct Tables {
    goals: Vec<GoalRecord>,
    approvals: Vec<ApprovalRequest>,
    scores: Vec<PerformanceScore>,
    actors: HashMap<String, DirectoryEntry>,
}

struct DirectoryEntry {
    actor: Actor,
    reviewer_id: Option<String>,
}

/// In-memory implementation of [`PersistenceGateway`] and [`ActorDirectory`].
#[derive(Default)]
pub struct MemoryGateway {
    tables: RwLock<Tables>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of goal rows across all actors and categories.
    pub async fn goal_row_count(&self) -> usize {
        self.tables.read().await.goals.len()
    }

    /// Total number of approval rows.
    pub async fn approval_row_count(&self) -> usize {
        self.tables.read().await.approvals.len()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn append_goal(&self, record: &GoalRecord) -> Result<Uuid, StoreError> {
        let mut row = record.clone();
        let row_id = *row.record_id.get_or_insert_with(Uuid::new_v4);
        self.tables.write().await.goals.push(row);
        Ok(row_id)
    }

    async fn latest_goal(
        &self,
        actor_id: &str,
        category: Category,
    ) -> Result<Option<GoalRecord>, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables
            .goals
            .iter()
            .filter(|r| r.actor_id == actor_id && r.category == category);
        Ok(latest(rows, |r| r.created_at).cloned())
    }

    async fn goal_history(
        &self,
        actor_id: &str,
        category: Category,
    ) -> Result<Vec<GoalRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .goals
            .iter()
            .filter(|r| r.actor_id == actor_id && r.category == category)
            .cloned()
            .collect())
    }

    async fn append_approval(&self, request: &ApprovalRequest) -> Result<Uuid, StoreError> {
        self.tables.write().await.approvals.push(request.clone());
        Ok(request.request_id)
    }

    async fn latest_approval(
        &self,
        subject_id: &str,
    ) -> Result<Option<ApprovalRequest>, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables
            .approvals
            .iter()
            .filter(|r| r.subject_id == subject_id);
        Ok(latest(rows, |r| r.created_at).cloned())
    }

    async fn latest_approvals_for_reviewer(
        &self,
        reviewer_id: &str,
    ) -> Result<Vec<ApprovalRequest>, StoreError> {
        let tables = self.tables.read().await;
        Ok(
            latest_per_key(&tables.approvals, |r| r.subject_id.clone(), |r| r.created_at)
                .into_iter()
                .filter(|r| r.reviewer_id == reviewer_id)
                .cloned()
                .collect(),
        )
    }

    async fn append_score(&self, score: &PerformanceScore) -> Result<Uuid, StoreError> {
        self.tables.write().await.scores.push(score.clone());
        Ok(score.score_id)
    }

    async fn latest_scores(&self, actor_id: &str) -> Result<Vec<PerformanceScore>, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables.scores.iter().filter(|s| s.actor_id == actor_id);
        Ok(latest_per_key(rows, |s| s.category, |s| s.created_at)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ActorDirectory for MemoryGateway {
    async fn actor(&self, actor_id: &str) -> Result<Option<Actor>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.actors.get(actor_id).map(|e| e.actor.clone()))
    }

    async fn upsert(&self, actor: Actor, reviewer_id: Option<String>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .actors
            .insert(actor.id.clone(), DirectoryEntry { actor, reviewer_id });
        Ok(())
    }

    async fn set_password_changed(&self, actor_id: &str) -> Result<Actor, StoreError> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .actors
            .get_mut(actor_id)
            .ok_or_else(|| StoreError::ActorNotFound(actor_id.to_string()))?;
        entry.actor.password_changed = true;
        Ok(entry.actor.clone())
    }

    async fn set_onboarding_complete(&self, actor_id: &str) -> Result<Actor, StoreError> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .actors
            .get_mut(actor_id)
            .ok_or_else(|| StoreError::ActorNotFound(actor_id.to_string()))?;
        entry.actor.onboarding_complete = true;
        Ok(entry.actor.clone())
    }

    async fn reviewer_of(&self, subject_id: &str) -> Result<Option<String>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .actors
            .get(subject_id)
            .and_then(|e| e.reviewer_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ApprovalStatus, GoalStatus, OnboardingContent, Payload};

    fn payload(key: &str, value: &str) -> Payload {
        let mut p = Payload::new();
        p.insert(key.to_string(), serde_json::Value::String(value.to_string()));
        p
    }

    #[tokio::test]
    async fn latest_goal_is_last_appended() {
        let gw = MemoryGateway::new();
        let in_progress = |p| GoalRecord::new("a1", Category::Business, p, GoalStatus::InProgress);
        let first = in_progress(payload("k", "1"));
        let mut second = in_progress(payload("k", "2"));
        second.created_at = first.created_at;

        gw.append_goal(&first).await.unwrap();
        let id = gw.append_goal(&second).await.unwrap();

        let current = gw
            .latest_goal("a1", Category::Business)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.record_id, Some(id));
        assert_eq!(current.payload, payload("k", "2"));
    }

    #[tokio::test]
    async fn goal_streams_are_keyed_by_actor_and_category() {
        let gw = MemoryGateway::new();
        let row = GoalRecord::new("a1", Category::People, Payload::new(), GoalStatus::InProgress);
        gw.append_goal(&row).await.unwrap();

        assert!(gw.latest_goal("a1", Category::Quality).await.unwrap().is_none());
        assert!(gw.latest_goal("a2", Category::People).await.unwrap().is_none());
        assert_eq!(gw.goal_history("a1", Category::People).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn append_assigns_id_to_synthetic_draft() {
        let gw = MemoryGateway::new();
        let draft = GoalRecord::draft("a1", Category::Industry);
        let id = gw.append_goal(&draft).await.unwrap();
        let stored = gw.latest_goal("a1", Category::Industry).await.unwrap().unwrap();
        assert_eq!(stored.record_id, Some(id));
    }

    #[tokio::test]
    async fn reviewer_view_uses_each_subjects_latest_row() {
        let gw = MemoryGateway::new();
        let a = ApprovalRequest::pending("a", "m-1", OnboardingContent::default());
        let b = ApprovalRequest::pending("b", "m-1", OnboardingContent::default());
        let other = ApprovalRequest::pending("c", "m-2", OnboardingContent::default());
        gw.append_approval(&a).await.unwrap();
        gw.append_approval(&b).await.unwrap();
        gw.append_approval(&other).await.unwrap();
        gw.append_approval(&a.decided(ApprovalStatus::Approved)).await.unwrap();

        let rows = gw.latest_approvals_for_reviewer("m-1").await.unwrap();
        let summary: Vec<(&str, ApprovalStatus)> = rows
            .iter()
            .map(|r| (r.subject_id.as_str(), r.status))
            .collect();
        assert_eq!(
            summary,
            vec![("a", ApprovalStatus::Approved), ("b", ApprovalStatus::Pending)]
        );
    }

    #[tokio::test]
    async fn latest_scores_one_per_category() {
        let gw = MemoryGateway::new();
        gw.append_score(&PerformanceScore::new("a1", Category::Business, 10.0, 50.0, 100.0))
            .await
            .unwrap();
        gw.append_score(&PerformanceScore::new("a1", Category::Business, 20.0, 50.0, 100.0))
            .await
            .unwrap();
        gw.append_score(&PerformanceScore::new("a1", Category::People, 5.0, 10.0, 100.0))
            .await
            .unwrap();
        gw.append_score(&PerformanceScore::new("a2", Category::People, 1.0, 1.0, 100.0))
            .await
            .unwrap();

        let scores = gw.latest_scores("a1").await.unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].category, Category::Business);
        assert_eq!(scores[0].current_score, 20.0);
    }

    #[tokio::test]
    async fn directory_flags_flip_in_place() {
        let gw = MemoryGateway::new();
        gw.upsert(Actor::new("093344", "Dana"), Some("m-1".into()))
            .await
            .unwrap();

        let actor = gw.set_password_changed("093344").await.unwrap();
        assert!(actor.password_changed);
        assert!(!actor.onboarding_complete);

        let actor = gw.set_onboarding_complete("093344").await.unwrap();
        assert!(actor.onboarding_complete);
        assert_eq!(gw.reviewer_of("093344").await.unwrap().as_deref(), Some("m-1"));
    }

    #[tokio::test]
    async fn flipping_unknown_actor_is_not_found() {
        let gw = MemoryGateway::new();
        let result = gw.set_password_changed("ghost").await;
        assert!(matches!(result, Err(StoreError::ActorNotFound(_))));
    }
}
