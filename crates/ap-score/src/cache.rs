// cache.rs — ScoreCache: one actor's latest scores, loaded on first touch.
//
// The cache has a single owner at a time. `ensure_loaded` for the current
// owner is a no-op; for anyone else it reads the gateway and swaps owner and
// contents under one write lock, so readers see either the old actor's
// scores or the new actor's, never a mix.
//
// Staleness: other sessions' writes are invisible until an owner switch or
// an explicit `invalidate`. A same-owner reload never replaces a local row
// with an older one, so an `update` that lands while the reload is reading
// the gateway survives the swap.

use std::collections::HashMap;
use std::sync::Arc;

use ap_store::{Category, PerformanceScore, PersistenceGateway};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::ScoreError;

/// Score defaults (`[scores]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreConfig {
    /// `max_score` for a category that has never been scored.
    #[serde(default = "default_max_score")]
    pub default_max_score: f64,
}

fn default_max_score() -> f64 {
    100.0
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            default_max_score: default_max_score(),
        }
    }
}

struct Loaded {
    owner: String,
    scores: HashMap<Category, PerformanceScore>,
}

/// Write-through cache of one actor's [`PerformanceScore`]s.
pub struct ScoreCache {
    gateway: Arc<dyn PersistenceGateway>,
    config: ScoreConfig,
    state: RwLock<Option<Loaded>>,
}

impl ScoreCache {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, config: ScoreConfig) -> Self {
        Self {
            gateway,
            config,
            state: RwLock::new(None),
        }
    }

    /// Make `actor_id` the owner, reloading unless it already owns a
    /// non-empty cache.
    pub async fn ensure_loaded(&self, actor_id: &str) -> Result<(), ScoreError> {
        {
            let state = self.state.read().await;
            if let Some(loaded) = state.as_ref() {
                if loaded.owner == actor_id && !loaded.scores.is_empty() {
                    tracing::debug!(actor_id, "score cache hit");
                    return Ok(());
                }
            }
        }

        // Built without holding the lock; a failed read leaves the old
        // contents in place.
        let rows = self.gateway.latest_scores(actor_id).await?;
        let mut scores: HashMap<Category, PerformanceScore> =
            rows.into_iter().map(|s| (s.category, s)).collect();

        let mut state = self.state.write().await;
        if let Some(current) = state.as_ref().filter(|l| l.owner == actor_id) {
            for (category, local) in &current.scores {
                let local_is_newer = scores
                    .get(category)
                    .map_or(true, |read| local.created_at > read.created_at);
                if local_is_newer {
                    tracing::debug!(actor_id, %category, "keeping newer local score");
                    scores.insert(*category, local.clone());
                }
            }
        }
        let count = scores.len();
        *state = Some(Loaded {
            owner: actor_id.to_string(),
            scores,
        });
        tracing::info!(actor_id, categories = count, "score cache loaded");
        Ok(())
    }

    /// The cached score for `category`, if loaded and present.
    pub async fn get(&self, category: Category) -> Option<PerformanceScore> {
        self.state
            .read()
            .await
            .as_ref()
            .and_then(|l| l.scores.get(&category).cloned())
    }

    /// Every cached score, in category order.
    pub async fn all(&self) -> Vec<PerformanceScore> {
        let state = self.state.read().await;
        let mut scores: Vec<PerformanceScore> = state
            .as_ref()
            .map(|l| l.scores.values().cloned().collect())
            .unwrap_or_default();
        scores.sort_by_key(|s| s.category);
        scores
    }

    pub async fn owner(&self) -> Option<String> {
        self.state.read().await.as_ref().map(|l| l.owner.clone())
    }

    /// Append a new score row for the owner, then update the local copy.
    ///
    /// If the owner changed while the write was in flight the row is still
    /// persisted, but the new owner's cache is left alone.
    pub async fn update(
        &self,
        category: Category,
        current: f64,
        target: f64,
    ) -> Result<PerformanceScore, ScoreError> {
        if !current.is_finite() || !target.is_finite() {
            return Err(ScoreError::InvalidValue {
                category,
                current,
                target,
            });
        }

        let (owner, previous) = {
            let state = self.state.read().await;
            let loaded = state.as_ref().ok_or(ScoreError::NotLoaded)?;
            (loaded.owner.clone(), loaded.scores.get(&category).cloned())
        };

        let max_score = previous
            .as_ref()
            .map_or(self.config.default_max_score, |p| p.max_score);
        let mut row = PerformanceScore::new(&owner, category, current, target, max_score);
        if let Some(previous) = &previous {
            row.created_at = Utc::now().max(previous.created_at);
        }

        self.gateway.append_score(&row).await?;

        let mut state = self.state.write().await;
        match state.as_mut() {
            Some(loaded) if loaded.owner == owner => {
                loaded.scores.insert(category, row.clone());
            }
            _ => tracing::debug!(
                actor_id = %owner,
                "owner changed during update; local copy skipped"
            ),
        }
        tracing::info!(actor_id = %owner, %category, current, target, "score updated");
        Ok(row)
    }

    /// Drop the cache if `actor_id` owns it. Returns whether anything was
    /// dropped; the next `ensure_loaded` reloads from the gateway.
    pub async fn invalidate(&self, actor_id: &str) -> bool {
        let mut state = self.state.write().await;
        if state.as_ref().map_or(false, |l| l.owner == actor_id) {
            *state = None;
            tracing::debug!(actor_id, "score cache invalidated");
            true
        } else {
            false
        }
    }
}
