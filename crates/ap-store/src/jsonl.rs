// jsonl.rs — File-backed gateway: one JSONL log per table.
//
// Each append-only table is a JSONL (JSON Lines) file: one JSON object per
// line, opened in append mode so existing rows are never overwritten. Reads
// scan the whole file and reduce it with the latest-row rules.
//
// An append cut short (crash mid-write, or a read racing a write) leaves a
// truncated last line. Reads skip truncated rows with a warning, and the
// next append starts on a fresh line so it is never glued onto the fragment.
//
// Actors are the one mutable entity, stored as `<actors_dir>/<id>.json` so
// each account is isolated and easy to inspect manually.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::gateway::{ActorDirectory, PersistenceGateway};
use crate::latest::{latest, latest_per_key};
use crate::record::{Actor, ApprovalRequest, Category, GoalRecord, PerformanceScore};

/// Where each table lives on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreLayout {
    /// Append-only log of goal records.
    pub goals_log: PathBuf,
    /// Append-only log of approval requests.
    pub approvals_log: PathBuf,
    /// Append-only log of score rows.
    pub scores_log: PathBuf,
    /// One JSON file per actor.
    pub actors_dir: PathBuf,
}

impl StoreLayout {
    /// Standard layout under a single data directory.
    pub fn under(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            goals_log: dir.join("goals.jsonl"),
            approvals_log: dir.join("approvals.jsonl"),
            scores_log: dir.join("scores.jsonl"),
            actors_dir: dir.join("actors"),
        }
    }

    /// Standard `.appraise/` layout for a project.
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        Self::under(project_root.as_ref().join(".appraise"))
    }
}

/// Actor file contents: the actor plus their place in the org hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActorEntry {
    #[serde(flatten)]
    actor: Actor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reviewer_id: Option<String>,
}

/// JSONL-backed implementation of [`PersistenceGateway`] and [`ActorDirectory`].
pub struct JsonlGateway {
    layout: StoreLayout,
    /// Serializes appends from this process so lines never interleave.
    write_lock: Mutex<()>,
}

impl JsonlGateway {
    /// Open a gateway over `layout`, creating directories as needed.
    pub async fn open(layout: StoreLayout) -> Result<Self, StoreError> {
        for log in [&layout.goals_log, &layout.approvals_log, &layout.scores_log] {
            if let Some(parent) = log.parent() {
                create_dir(parent).await?;
            }
        }
        create_dir(&layout.actors_dir).await?;
        Ok(Self {
            layout,
            write_lock: Mutex::new(()),
        })
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Append one row as a single JSON line and flush.
    async fn append_row<T: Serialize>(&self, path: &Path, row: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(row)?;
        let _guard = self.write_lock.lock().await;

        let mut line = String::with_capacity(json.len() + 2);
        if ends_mid_line(path).await? {
            tracing::warn!(path = %path.display(), "log ends mid-line; starting a new line");
            line.push('\n');
        }
        line.push_str(&json);
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|source| io_error(path, source))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|source| io_error(path, source))?;
        file.flush().await.map_err(|source| io_error(path, source))?;
        tracing::debug!(path = %path.display(), "appended row");
        Ok(())
    }

    /// Read every row of a log in append order. A missing file is an empty
    /// table; blank lines and truncated rows are skipped.
    async fn read_rows<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>, StoreError> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(io_error(path, source)),
        };
        let mut rows: Vec<T> = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(line) {
                Ok(row) => rows.push(row),
                // Cut off mid-object: an interrupted append, not a bad row.
                Err(e) if e.is_eof() => {
                    tracing::warn!(
                        path = %path.display(),
                        line = index + 1,
                        "skipping truncated row"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(rows)
    }

    fn actor_file(&self, actor_id: &str) -> Result<PathBuf, StoreError> {
        if actor_id.is_empty()
            || actor_id.contains("..")
            || actor_id.contains('/')
            || actor_id.contains('\\')
        {
            return Err(StoreError::InvalidKey(actor_id.to_string()));
        }
        Ok(self.layout.actors_dir.join(format!("{}.json", actor_id)))
    }

    async fn load_entry(&self, actor_id: &str) -> Result<Option<ActorEntry>, StoreError> {
        let path = self.actor_file(actor_id)?;
        match fs::read_to_string(&path).await {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(io_error(&path, source)),
        }
    }

    async fn save_entry(&self, entry: &ActorEntry) -> Result<(), StoreError> {
        let path = self.actor_file(&entry.actor.id)?;
        let json = serde_json::to_string_pretty(entry)?;
        fs::write(&path, json)
            .await
            .map_err(|source| io_error(&path, source))
    }

    async fn update_actor<F>(&self, actor_id: &str, apply: F) -> Result<Actor, StoreError>
    where
        F: FnOnce(&mut Actor) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut entry = self
            .load_entry(actor_id)
            .await?
            .ok_or_else(|| StoreError::ActorNotFound(actor_id.to_string()))?;
        apply(&mut entry.actor);
        self.save_entry(&entry).await?;
        Ok(entry.actor)
    }
}

#[async_trait]
impl PersistenceGateway for JsonlGateway {
    async fn append_goal(&self, record: &GoalRecord) -> Result<Uuid, StoreError> {
        let mut row = record.clone();
        let row_id = *row.record_id.get_or_insert_with(Uuid::new_v4);
        self.append_row(&self.layout.goals_log, &row).await?;
        Ok(row_id)
    }

    async fn latest_goal(
        &self,
        actor_id: &str,
        category: Category,
    ) -> Result<Option<GoalRecord>, StoreError> {
        let rows: Vec<GoalRecord> = self.read_rows(&self.layout.goals_log).await?;
        let matching = rows
            .iter()
            .filter(|r| r.actor_id == actor_id && r.category == category);
        Ok(latest(matching, |r| r.created_at).cloned())
    }

    async fn goal_history(
        &self,
        actor_id: &str,
        category: Category,
    ) -> Result<Vec<GoalRecord>, StoreError> {
        let rows: Vec<GoalRecord> = self.read_rows(&self.layout.goals_log).await?;
        Ok(rows
            .into_iter()
            .filter(|r| r.actor_id == actor_id && r.category == category)
            .collect())
    }

    async fn append_approval(&self, request: &ApprovalRequest) -> Result<Uuid, StoreError> {
        self.append_row(&self.layout.approvals_log, request).await?;
        Ok(request.request_id)
    }

    async fn latest_approval(
        &self,
        subject_id: &str,
    ) -> Result<Option<ApprovalRequest>, StoreError> {
        let rows: Vec<ApprovalRequest> = self.read_rows(&self.layout.approvals_log).await?;
        let matching = rows.iter().filter(|r| r.subject_id == subject_id);
        Ok(latest(matching, |r| r.created_at).cloned())
    }

    async fn latest_approvals_for_reviewer(
        &self,
        reviewer_id: &str,
    ) -> Result<Vec<ApprovalRequest>, StoreError> {
        let rows: Vec<ApprovalRequest> = self.read_rows(&self.layout.approvals_log).await?;
        Ok(
            latest_per_key(&rows, |r| r.subject_id.clone(), |r| r.created_at)
                .into_iter()
                .filter(|r| r.reviewer_id == reviewer_id)
                .cloned()
                .collect(),
        )
    }

    async fn append_score(&self, score: &PerformanceScore) -> Result<Uuid, StoreError> {
        self.append_row(&self.layout.scores_log, score).await?;
        Ok(score.score_id)
    }

    async fn latest_scores(&self, actor_id: &str) -> Result<Vec<PerformanceScore>, StoreError> {
        let rows: Vec<PerformanceScore> = self.read_rows(&self.layout.scores_log).await?;
        let matching = rows.iter().filter(|s| s.actor_id == actor_id);
        Ok(latest_per_key(matching, |s| s.category, |s| s.created_at)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ActorDirectory for JsonlGateway {
    async fn actor(&self, actor_id: &str) -> Result<Option<Actor>, StoreError> {
        Ok(self.load_entry(actor_id).await?.map(|e| e.actor))
    }

    async fn upsert(&self, actor: Actor, reviewer_id: Option<String>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.save_entry(&ActorEntry { actor, reviewer_id }).await
    }

    async fn set_password_changed(&self, actor_id: &str) -> Result<Actor, StoreError> {
        self.update_actor(actor_id, |a| a.password_changed = true)
            .await
    }

    async fn set_onboarding_complete(&self, actor_id: &str) -> Result<Actor, StoreError> {
        self.update_actor(actor_id, |a| a.onboarding_complete = true)
            .await
    }

    async fn reviewer_of(&self, subject_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .load_entry(subject_id)
            .await?
            .and_then(|e| e.reviewer_id))
    }
}

async fn create_dir(path: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(path)
        .await
        .map_err(|source| io_error(path, source))
}

/// Whether a non-empty log lacks its final newline.
async fn ends_mid_line(path: &Path) -> Result<bool, StoreError> {
    let mut file = match fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(source) => return Err(io_error(path, source)),
    };
    let len = file
        .metadata()
        .await
        .map_err(|source| io_error(path, source))?
        .len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))
        .await
        .map_err(|source| io_error(path, source))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)
        .await
        .map_err(|source| io_error(path, source))?;
    Ok(last[0] != b'\n')
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ApprovalStatus, GoalStatus, OnboardingContent, Payload};
    use tempfile::tempdir;

    #[tokio::test]
    async fn goal_rows_survive_reopen() {
        let dir = tempdir().unwrap();
        let layout = StoreLayout::under(dir.path().join("data"));

        let record = GoalRecord::new(
            "a1",
            Category::Quality,
            Payload::new(),
            GoalStatus::InProgress,
        );
        {
            let gw = JsonlGateway::open(layout.clone()).await.unwrap();
            gw.append_goal(&record).await.unwrap();
        }

        let gw = JsonlGateway::open(layout).await.unwrap();
        let current = gw
            .latest_goal("a1", Category::Quality)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.record_id, record.record_id);
        assert_eq!(current.status, GoalStatus::InProgress);
    }

    #[tokio::test]
    async fn appends_never_rewrite_existing_lines() {
        let dir = tempdir().unwrap();
        let gw = JsonlGateway::open(StoreLayout::under(dir.path())).await.unwrap();

        for status in [
            GoalStatus::InProgress,
            GoalStatus::InProgress,
            GoalStatus::Submitted,
        ] {
            let row = GoalRecord::new("a1", Category::Business, Payload::new(), status);
            gw.append_goal(&row).await.unwrap();
        }

        let content = std::fs::read_to_string(&gw.layout().goals_log).unwrap();
        assert_eq!(content.lines().count(), 3);
        let history = gw.goal_history("a1", Category::Business).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].status, GoalStatus::Submitted);
    }

    #[tokio::test]
    async fn missing_logs_read_as_empty() {
        let dir = tempdir().unwrap();
        let gw = JsonlGateway::open(StoreLayout::under(dir.path())).await.unwrap();
        assert!(gw.latest_approval("nobody").await.unwrap().is_none());
        assert!(gw.latest_scores("nobody").await.unwrap().is_empty());
        assert!(gw.actor("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_line_is_a_serialization_error() {
        let dir = tempdir().unwrap();
        let gw = JsonlGateway::open(StoreLayout::under(dir.path())).await.unwrap();
        std::fs::write(&gw.layout().approvals_log, "{not json}\n").unwrap();

        let result = gw.latest_approval("a1").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn truncated_last_row_is_skipped_and_not_glued_to() {
        let dir = tempdir().unwrap();
        let gw = JsonlGateway::open(StoreLayout::under(dir.path())).await.unwrap();
        let first = GoalRecord::new("a1", Category::People, Payload::new(), GoalStatus::InProgress);
        gw.append_goal(&first).await.unwrap();

        // An append that died after writing part of the object.
        let mut log = std::fs::OpenOptions::new()
            .append(true)
            .open(&gw.layout().goals_log)
            .unwrap();
        std::io::Write::write_all(&mut log, b"{\"record_id\":\"0000").unwrap();
        drop(log);

        let current = gw.latest_goal("a1", Category::People).await.unwrap().unwrap();
        assert_eq!(current.record_id, first.record_id);

        let second = GoalRecord::new("a1", Category::People, Payload::new(), GoalStatus::Submitted);
        gw.append_goal(&second).await.unwrap();

        let current = gw.latest_goal("a1", Category::People).await.unwrap().unwrap();
        assert_eq!(current.record_id, second.record_id);
        assert_eq!(gw.goal_history("a1", Category::People).await.unwrap().len(), 2);

        let content = std::fs::read_to_string(&gw.layout().goals_log).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.ends_with('\n'));
    }

    #[tokio::test]
    async fn reviewer_view_reads_latest_rows() {
        let dir = tempdir().unwrap();
        let gw = JsonlGateway::open(StoreLayout::under(dir.path())).await.unwrap();

        let req = ApprovalRequest::pending("093344", "m-1", OnboardingContent::default());
        gw.append_approval(&req).await.unwrap();
        assert_eq!(gw.latest_approvals_for_reviewer("m-1").await.unwrap().len(), 1);

        gw.append_approval(&req.decided(ApprovalStatus::Rejected))
            .await
            .unwrap();
        let rows = gw.latest_approvals_for_reviewer("m-1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ApprovalStatus::Rejected);
    }

    #[tokio::test]
    async fn actor_flags_persist_to_disk() {
        let dir = tempdir().unwrap();
        let gw = JsonlGateway::open(StoreLayout::under(dir.path())).await.unwrap();
        gw.upsert(Actor::new("093344", "Dana"), Some("m-1".into()))
            .await
            .unwrap();
        gw.set_password_changed("093344").await.unwrap();

        let json = std::fs::read_to_string(dir.path().join("actors/093344.json")).unwrap();
        assert!(json.contains("\"password_changed\": true"));
        assert!(json.contains("\"reviewer_id\": \"m-1\""));
    }

    #[tokio::test]
    async fn actor_ids_cannot_escape_the_directory() {
        let dir = tempdir().unwrap();
        let gw = JsonlGateway::open(StoreLayout::under(dir.path())).await.unwrap();
        let result = gw.actor("../etc/passwd").await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));
    }
}
