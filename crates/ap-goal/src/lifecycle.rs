// lifecycle.rs — The Draft → InProgress → Submitted machine for one
// (actor, category) stream.
//
// Writes never update a row: `save` validates, checks the terminal state and
// appends a new row. `current` is a derived query (latest row wins), with a
// synthetic empty Draft standing in when nothing has been saved yet.
//
// Order of checks in `save`:
//   1. Current status is Submitted            → AlreadySubmitted
//   2. Required fields                        → ValidationFailed
//   3. Append the new row
// A submitted stream rejects every payload, complete or not. Both
// rejections leave the row count unchanged.

use std::sync::Arc;

use ap_events::{ApEvent, EventDispatcher};
use ap_store::{Category, GoalRecord, GoalStatus, Payload, PersistenceGateway};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::GoalError;
use crate::validator::ValidatorRegistry;

/// Target status for a save. Draft is only ever the implicit starting state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaveAs {
    InProgress,
    Submitted,
}

impl From<SaveAs> for GoalStatus {
    fn from(target: SaveAs) -> Self {
        match target {
            SaveAs::InProgress => GoalStatus::InProgress,
            SaveAs::Submitted => GoalStatus::Submitted,
        }
    }
}

/// Lifecycle operations over the goal tables, shared by every category.
pub struct GoalLifecycle {
    gateway: Arc<dyn PersistenceGateway>,
    validators: ValidatorRegistry,
    events: Option<Arc<EventDispatcher>>,
}

impl GoalLifecycle {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, validators: ValidatorRegistry) -> Self {
        Self {
            gateway,
            validators,
            events: None,
        }
    }

    /// Emit `goal_saved` / `goal_submitted` events on every append.
    pub fn with_events(mut self, events: Arc<EventDispatcher>) -> Self {
        self.events = Some(events);
        self
    }

    /// The current record: the latest row, or a synthetic empty Draft.
    ///
    /// Absence is a state, not an error; only gateway failures surface.
    pub async fn current(
        &self,
        actor_id: &str,
        category: Category,
    ) -> Result<GoalRecord, GoalError> {
        let latest = self.gateway.latest_goal(actor_id, category).await?;
        tracing::debug!(actor_id, %category, found = latest.is_some(), "read current goal");
        Ok(latest.unwrap_or_else(|| GoalRecord::draft(actor_id, category)))
    }

    /// Validate and append a new row with status `target`.
    ///
    /// Not idempotent: each successful call appends. A `current` call right
    /// after returns exactly the row returned here.
    pub async fn save(
        &self,
        actor_id: &str,
        category: Category,
        payload: Payload,
        target: SaveAs,
    ) -> Result<GoalRecord, GoalError> {
        let current = self.current(actor_id, category).await?;
        if current.status.is_terminal() {
            return Err(GoalError::AlreadySubmitted {
                actor_id: actor_id.to_string(),
                category,
            });
        }

        let missing_fields = self.validators.missing_fields(category, &payload);
        if !missing_fields.is_empty() {
            tracing::debug!(actor_id, %category, ?missing_fields, "goal save rejected");
            return Err(GoalError::ValidationFailed {
                category,
                missing_fields,
            });
        }

        let mut record = GoalRecord::new(actor_id, category, payload, target.into());
        // Never older than the row it supersedes, so it wins the latest-row
        // query even if the clock stepped back.
        record.created_at = Utc::now().max(current.created_at);

        let row_id = self.gateway.append_goal(&record).await?;
        record.record_id = Some(row_id);

        tracing::info!(
            actor_id,
            %category,
            status = %record.status,
            %row_id,
            "goal record appended"
        );
        if let Some(events) = &self.events {
            events.dispatch(&ApEvent::goal_written(
                actor_id,
                category,
                row_id,
                record.status,
            ));
        }
        Ok(record)
    }

    /// Every row for the stream, oldest first.
    pub async fn history(
        &self,
        actor_id: &str,
        category: Category,
    ) -> Result<Vec<GoalRecord>, GoalError> {
        Ok(self.gateway.goal_history(actor_id, category).await?)
    }
}
