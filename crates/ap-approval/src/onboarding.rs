// onboarding.rs — The two actor-flag flips that unlock the access gate.
//
// change_password: password_changed = true.
// submit:          append a Pending request for the subject's reviewer, then
//                  onboarding_complete = true.
//
// The request is appended before the flag is flipped. If the flip fails the
// subject sees the onboarding surface again, and resubmitting finds its own
// Pending row and only retries the flip.

use std::sync::Arc;

use ap_events::{ApEvent, EventDispatcher};
use ap_store::{
    Actor, ActorDirectory, ApprovalRequest, ApprovalStatus, OnboardingContent, PersistenceGateway,
};
use chrono::Utc;

use crate::error::ApprovalError;

/// Password-change and onboarding-submission operations.
pub struct Onboarding {
    directory: Arc<dyn ActorDirectory>,
    gateway: Arc<dyn PersistenceGateway>,
    events: Option<Arc<EventDispatcher>>,
}

impl Onboarding {
    pub fn new(directory: Arc<dyn ActorDirectory>, gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            directory,
            gateway,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Arc<EventDispatcher>) -> Self {
        self.events = Some(events);
        self
    }

    /// Record that the actor replaced their initial password.
    pub async fn change_password(&self, actor_id: &str) -> Result<Actor, ApprovalError> {
        let actor = self.directory.set_password_changed(actor_id).await?;
        tracing::info!(actor_id, "password changed");
        self.emit(ApEvent::PasswordChanged {
            actor_id: actor_id.to_string(),
            timestamp: Utc::now(),
        });
        Ok(actor)
    }

    /// Submit (or, after a rejection, resubmit) the GSP and Focus 30.
    ///
    /// Returns the Pending request now awaiting review.
    pub async fn submit(
        &self,
        subject_id: &str,
        content: OnboardingContent,
    ) -> Result<ApprovalRequest, ApprovalError> {
        let missing_fields = missing_fields(&content);
        if !missing_fields.is_empty() {
            return Err(ApprovalError::ValidationFailed { missing_fields });
        }

        let actor = self
            .directory
            .actor(subject_id)
            .await?
            .ok_or_else(|| ApprovalError::ActorNotFound(subject_id.to_string()))?;
        let reviewer_id = self
            .directory
            .reviewer_of(subject_id)
            .await?
            .ok_or_else(|| ApprovalError::NoReviewer(subject_id.to_string()))?;

        let latest = self.gateway.latest_approval(subject_id).await?;
        match latest.as_ref().map(|r| r.status) {
            Some(ApprovalStatus::Pending) => {
                return match latest {
                    Some(pending) if !actor.onboarding_complete => {
                        tracing::info!(subject_id, "retrying onboarding flag for pending request");
                        self.directory.set_onboarding_complete(subject_id).await?;
                        Ok(pending)
                    }
                    _ => Err(ApprovalError::AlreadyPending {
                        subject_id: subject_id.to_string(),
                    }),
                };
            }
            Some(ApprovalStatus::Approved) => {
                return Err(ApprovalError::AlreadyApproved {
                    subject_id: subject_id.to_string(),
                })
            }
            Some(ApprovalStatus::Rejected) | None => {}
        }

        let mut request = ApprovalRequest::pending(subject_id, &reviewer_id, content);
        if let Some(previous) = &latest {
            request.created_at = request.created_at.max(previous.created_at);
        }
        let request_id = self.gateway.append_approval(&request).await?;
        tracing::info!(
            subject_id,
            reviewer_id = %reviewer_id,
            resubmission = latest.is_some(),
            "onboarding submitted for approval"
        );
        self.emit(ApEvent::ApprovalRequested {
            subject_id: subject_id.to_string(),
            reviewer_id,
            request_id,
            timestamp: Utc::now(),
        });

        if !actor.onboarding_complete {
            self.directory.set_onboarding_complete(subject_id).await?;
        }
        Ok(request)
    }

    fn emit(&self, event: ApEvent) {
        if let Some(events) = &self.events {
            events.dispatch(&event);
        }
    }
}

fn missing_fields(content: &OnboardingContent) -> Vec<String> {
    let mut missing = Vec::new();
    if content.gsp.trim().is_empty() {
        missing.push("gsp".to_string());
    }
    if content.focus30.trim().is_empty() {
        missing.push("focus30".to_string());
    }
    missing
}
