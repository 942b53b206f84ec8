// Shared fixtures for ap-approval integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use ap_store::{
    Actor, ActorDirectory, ApprovalRequest, Category, GoalRecord, MemoryGateway,
    OnboardingContent, PerformanceScore, PersistenceGateway, StoreError,
};
use async_trait::async_trait;
use tokio::sync::Barrier;
use uuid::Uuid;

/// MemoryGateway that refuses approval appends for chosen subjects, and can
/// hold approval reads until several callers have all read.
#[derive(Default)]
pub struct FlakyGateway {
    pub inner: MemoryGateway,
    failing: Mutex<HashSet<String>>,
    read_barrier: Mutex<Option<Arc<Barrier>>>,
}

impl FlakyGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every later approval append for `subject_id` fail.
    pub fn fail_appends_for(&self, subject_id: &str) {
        self.failing.lock().unwrap().insert(subject_id.to_string());
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Hold each `latest_approval` until `readers` calls have read.
    pub fn line_up_reads(&self, readers: usize) {
        *self.read_barrier.lock().unwrap() = Some(Arc::new(Barrier::new(readers)));
    }

    pub fn release_reads(&self) {
        self.read_barrier.lock().unwrap().take();
    }

    fn is_failing(&self, subject_id: &str) -> bool {
        self.failing.lock().unwrap().contains(subject_id)
    }
}

#[async_trait]
impl PersistenceGateway for FlakyGateway {
    async fn append_goal(&self, record: &GoalRecord) -> Result<Uuid, StoreError> {
        self.inner.append_goal(record).await
    }

    async fn latest_goal(
        &self,
        actor_id: &str,
        category: Category,
    ) -> Result<Option<GoalRecord>, StoreError> {
        self.inner.latest_goal(actor_id, category).await
    }

    async fn goal_history(
        &self,
        actor_id: &str,
        category: Category,
    ) -> Result<Vec<GoalRecord>, StoreError> {
        self.inner.goal_history(actor_id, category).await
    }

    async fn append_approval(&self, request: &ApprovalRequest) -> Result<Uuid, StoreError> {
        if self.is_failing(&request.subject_id) {
            return Err(StoreError::Unavailable(format!(
                "injected failure for {}",
                request.subject_id
            )));
        }
        self.inner.append_approval(request).await
    }

    async fn latest_approval(
        &self,
        subject_id: &str,
    ) -> Result<Option<ApprovalRequest>, StoreError> {
        let latest = self.inner.latest_approval(subject_id).await?;
        let barrier = self.read_barrier.lock().unwrap().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
        Ok(latest)
    }

    async fn latest_approvals_for_reviewer(
        &self,
        reviewer_id: &str,
    ) -> Result<Vec<ApprovalRequest>, StoreError> {
        self.inner.latest_approvals_for_reviewer(reviewer_id).await
    }

    async fn append_score(&self, score: &PerformanceScore) -> Result<Uuid, StoreError> {
        self.inner.append_score(score).await
    }

    async fn latest_scores(&self, actor_id: &str) -> Result<Vec<PerformanceScore>, StoreError> {
        self.inner.latest_scores(actor_id).await
    }
}

#[async_trait]
impl ActorDirectory for FlakyGateway {
    async fn actor(&self, actor_id: &str) -> Result<Option<Actor>, StoreError> {
        self.inner.actor(actor_id).await
    }

    async fn upsert(&self, actor: Actor, reviewer_id: Option<String>) -> Result<(), StoreError> {
        self.inner.upsert(actor, reviewer_id).await
    }

    async fn set_password_changed(&self, actor_id: &str) -> Result<Actor, StoreError> {
        self.inner.set_password_changed(actor_id).await
    }

    async fn set_onboarding_complete(&self, actor_id: &str) -> Result<Actor, StoreError> {
        self.inner.set_onboarding_complete(actor_id).await
    }

    async fn reviewer_of(&self, subject_id: &str) -> Result<Option<String>, StoreError> {
        self.inner.reviewer_of(subject_id).await
    }
}

pub fn content(gsp: &str) -> OnboardingContent {
    OnboardingContent {
        gsp: gsp.to_string(),
        focus30: "Meet the team, read the playbook".to_string(),
    }
}

/// Register `subjects` under `reviewer` with both flags already set.
pub async fn seed_subjects(gw: &FlakyGateway, reviewer: &str, subjects: &[&str]) {
    for subject in subjects {
        let actor = Actor {
            password_changed: true,
            ..Actor::new(*subject, format!("Employee {}", subject))
        };
        gw.upsert(actor, Some(reviewer.to_string())).await.unwrap();
    }
}

pub fn subject_ids(requests: &[ApprovalRequest]) -> Vec<String> {
    requests.iter().map(|r| r.subject_id.clone()).collect()
}
