// config.rs — Project configuration (.appraise/config.toml) and paths.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;
use ap_events::PollerConfig;
use ap_gate::GateConfig;
use ap_goal::ValidatorRegistry;
use ap_score::ScoreConfig;
use ap_store::{Category, StoreLayout};
use serde::{Deserialize, Serialize};

/// Standard `.appraise/` layout for a project.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub project_root: PathBuf,
    pub config_file: PathBuf,
    pub events_log: PathBuf,
    pub store: StoreLayout,
}

impl ProjectPaths {
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        let root = project_root.as_ref().to_path_buf();
        let data_dir = root.join(".appraise");
        Self {
            config_file: data_dir.join("config.toml"),
            events_log: data_dir.join("events.jsonl"),
            store: StoreLayout::for_project(&root),
            project_root: root,
        }
    }
}

/// Top-level configuration from .appraise/config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gate: GateConfig,

    #[serde(default)]
    pub poller: PollerConfig,

    #[serde(default)]
    pub scores: ScoreConfig,

    /// Per-category settings, keyed by category name ("business", ...).
    #[serde(default)]
    pub categories: HashMap<String, CategoryConfig>,
}

/// `[categories.<name>]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Payload fields that must be non-empty on every save.
    #[serde(default)]
    pub required_fields: Vec<String>,
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        config.gate.validate()?;
        Ok(config)
    }

    /// Defaults when the file is missing; a file that exists must parse.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Required-field validators for every configured category.
    pub fn validators(&self) -> anyhow::Result<ValidatorRegistry> {
        let mut required = HashMap::new();
        for (name, category) in &self.categories {
            let parsed = Category::from_str(name).map_err(anyhow::Error::msg)?;
            required.insert(parsed, category.required_fields.clone());
        }
        Ok(ValidatorRegistry::from_required_fields(required))
    }
}
