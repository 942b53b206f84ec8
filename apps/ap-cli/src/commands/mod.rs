// mod.rs — Subcommand modules and the shared command context.

pub mod actor;
pub mod approval;
pub mod gate;
pub mod goal;
pub mod onboarding;
pub mod score;

use std::path::Path;
use std::sync::Arc;

use ap_events::{EventDispatcher, LogSink};
use ap_store::{ActorDirectory, JsonlGateway, PersistenceGateway};

use crate::config::{AppConfig, ProjectPaths};

/// Everything a subcommand needs: config, the project store and the event log.
pub struct Context {
    pub config: AppConfig,
    pub paths: ProjectPaths,
    store: Arc<JsonlGateway>,
    events: Arc<EventDispatcher>,
}

impl Context {
    pub async fn open(project_root: &Path) -> anyhow::Result<Self> {
        let paths = ProjectPaths::for_project(project_root);
        let config = AppConfig::load_or_default(&paths.config_file)?;
        let store = JsonlGateway::open(paths.store.clone()).await?;
        let events = EventDispatcher::new().with_sink(Box::new(LogSink::new(&paths.events_log)));
        tracing::debug!(root = %paths.project_root.display(), "project opened");
        Ok(Self {
            config,
            paths,
            store: Arc::new(store),
            events: Arc::new(events),
        })
    }

    pub fn gateway(&self) -> Arc<dyn PersistenceGateway> {
        self.store.clone()
    }

    pub fn directory(&self) -> Arc<dyn ActorDirectory> {
        self.store.clone()
    }

    pub fn events(&self) -> Arc<EventDispatcher> {
        self.events.clone()
    }
}
