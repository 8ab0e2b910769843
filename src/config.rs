use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::recall::RecallParams;
use crate::text::TermPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct NotegraphConfig {
    pub logging: LoggingConfig,
    pub notes: NotesConfig,
    pub cache: CacheConfig,
    pub retrieval: RetrievalConfig,
    pub lifecycle: LifecycleConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotesConfig {
    pub root: String,
    /// Glob patterns matched against note ids (paths relative to the root).
    pub exclude: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// Relative paths resolve against the notes root.
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_top_k: usize,
    pub lexical_weight: f64,
    pub structural_weight: f64,
    pub remove_stop_words: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LifecycleConfig {
    pub inbox_dir: String,
    pub archive_dir: String,
    pub consolidate_min_age_days: u64,
    pub decay_min_age_days: u64,
    pub decay_half_life_days: f64,
    pub archive_older_than_days: u64,
    pub archive_sources: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            root: ".".into(),
            exclude: Vec::new(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: ".neural/graph.json".into(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: 10,
            lexical_weight: 1.0,
            structural_weight: 0.5,
            remove_stop_words: true,
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            inbox_dir: "00_Inbox".into(),
            archive_dir: "99_Archives".into(),
            consolidate_min_age_days: 7,
            decay_min_age_days: 7,
            decay_half_life_days: 30.0,
            archive_older_than_days: 30,
            archive_sources: vec!["00_Inbox".into()],
        }
    }
}

/// Returns `~/.notegraph/`, or `.notegraph/` when there is no home directory.
pub fn default_notegraph_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".notegraph"))
        .unwrap_or_else(|| PathBuf::from(".notegraph"))
}

/// Returns the default config file path: `~/.notegraph/config.toml`
pub fn default_config_path() -> PathBuf {
    default_notegraph_dir().join("config.toml")
}

impl NotegraphConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            NotegraphConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (NOTEGRAPH_NOTES_ROOT, NOTEGRAPH_CACHE, NOTEGRAPH_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NOTEGRAPH_NOTES_ROOT") {
            self.notes.root = val;
        }
        if let Ok(val) = std::env::var("NOTEGRAPH_CACHE") {
            self.cache.path = val;
        }
        if let Ok(val) = std::env::var("NOTEGRAPH_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Notes root with `~` expanded.
    pub fn resolved_notes_root(&self) -> PathBuf {
        expand_tilde(&self.notes.root)
    }

    /// Cache file path. Relative paths live under the notes root.
    pub fn resolved_cache_path(&self) -> PathBuf {
        let path = expand_tilde(&self.cache.path);
        if path.is_absolute() {
            path
        } else {
            self.resolved_notes_root().join(path)
        }
    }

    pub fn term_policy(&self) -> TermPolicy {
        TermPolicy {
            remove_stop_words: self.retrieval.remove_stop_words,
        }
    }

    pub fn recall_params(&self) -> RecallParams {
        RecallParams {
            top_k: self.retrieval.default_top_k,
            lexical_weight: self.retrieval.lexical_weight,
            structural_weight: self.retrieval.structural_weight,
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
