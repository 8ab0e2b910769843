//! Age-based maintenance of the notes tree: consolidate, decay, archive.
//!
//! Every mode is idempotent for a fixed `now`: a second run with the same
//! clock over an unchanged tree reports zero touched notes and leaves file
//! bytes alone. Age is `now - mtime`; decay writes preserve mtime so a marked
//! note does not look freshly edited.

mod archive;
mod consolidate;
mod decay;

pub use archive::archive;
pub use consolidate::consolidate;
pub use decay::{decay, decay_score};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::config::LifecycleConfig;
use crate::error::{Error, Result};
use crate::notes::{is_markdown, relative_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleMode {
    Consolidate,
    Decay,
    Archive,
}

impl fmt::Display for LifecycleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Consolidate => "consolidate",
            Self::Decay => "decay",
            Self::Archive => "archive",
        })
    }
}

#[derive(Debug, Serialize)]
pub struct LifecycleReport {
    pub mode: LifecycleMode,
    /// Notes examined.
    pub processed: usize,
    /// Notes whose file, or whose summary entry, changed.
    pub touched: usize,
    pub details: Vec<String>,
    /// Consolidation files, as ids relative to the notes root.
    pub summary_paths: Vec<String>,
}

impl LifecycleReport {
    fn new(mode: LifecycleMode) -> Self {
        Self {
            mode,
            processed: 0,
            touched: 0,
            details: Vec::new(),
            summary_paths: Vec::new(),
        }
    }
}

/// Everything a lifecycle run needs: where, with which thresholds, and when.
#[derive(Debug, Clone)]
pub struct LifecycleContext {
    notes_root: PathBuf,
    config: LifecycleConfig,
    now: DateTime<Utc>,
}

impl LifecycleContext {
    /// Validate settings and canonicalize the root.
    ///
    /// Directory settings must be relative paths inside the root.
    pub fn new(notes_root: &Path, config: LifecycleConfig, now: DateTime<Utc>) -> Result<Self> {
        if !notes_root.is_dir() {
            return Err(Error::NotesRootMissing(notes_root.to_path_buf()));
        }
        let notes_root = notes_root
            .canonicalize()
            .map_err(|e| Error::io(notes_root, e))?;

        let dirs = [&config.inbox_dir, &config.archive_dir]
            .into_iter()
            .chain(config.archive_sources.iter());
        for dir in dirs {
            if !is_confined(dir) {
                return Err(Error::Usage(format!(
                    "lifecycle directory {dir:?} must be a relative path inside the notes root"
                )));
            }
        }
        if !(config.decay_half_life_days.is_finite() && config.decay_half_life_days > 0.0) {
            return Err(Error::Usage(format!(
                "decay_half_life_days must be positive (got {})",
                config.decay_half_life_days
            )));
        }

        Ok(Self {
            notes_root,
            config,
            now,
        })
    }

    pub fn notes_root(&self) -> &Path {
        &self.notes_root
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn archive_root(&self) -> PathBuf {
        self.notes_root.join(&self.config.archive_dir)
    }

    /// Markdown notes under `dir` (relative to the root), sorted by path.
    /// A missing directory has no notes.
    fn notes_in(&self, dir: &str) -> Result<Vec<AgedNote>> {
        let base = self.notes_root.join(dir);
        if !base.is_dir() {
            tracing::debug!(dir, "lifecycle directory absent");
            return Ok(Vec::new());
        }
        let mut notes = Vec::new();
        let walker = WalkDir::new(&base)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }
            let Some(id) = relative_id(entry.path(), &self.notes_root) else {
                continue;
            };
            let modified = crate::fsutil::modified_time(entry.path())?;
            let modified_at = DateTime::<Utc>::from(modified);
            notes.push(AgedNote {
                age_days: age_days(self.now, modified_at),
                id,
                path: entry.into_path(),
                modified,
                modified_at,
            });
        }
        Ok(notes)
    }
}

/// A note on disk with its age relative to the run's clock.
#[derive(Debug, Clone)]
struct AgedNote {
    id: String,
    path: PathBuf,
    modified: std::time::SystemTime,
    modified_at: DateTime<Utc>,
    age_days: f64,
}

/// Dispatch to one mode. `older_than_days` only applies to archive and
/// defaults to `archive_older_than_days`.
pub fn run(
    ctx: &LifecycleContext,
    mode: LifecycleMode,
    older_than_days: Option<u64>,
) -> Result<LifecycleReport> {
    let report = match mode {
        LifecycleMode::Consolidate => consolidate::consolidate(ctx)?,
        LifecycleMode::Decay => decay::decay(ctx)?,
        LifecycleMode::Archive => archive::archive(
            ctx,
            older_than_days.unwrap_or(ctx.config.archive_older_than_days),
        )?,
    };
    tracing::info!(
        mode = %report.mode,
        processed = report.processed,
        touched = report.touched,
        "lifecycle run complete"
    );
    Ok(report)
}

fn age_days(now: DateTime<Utc>, modified: DateTime<Utc>) -> f64 {
    let millis = (now - modified).num_milliseconds().max(0);
    millis as f64 / 86_400_000.0
}

fn is_confined(dir: &str) -> bool {
    let path = Path::new(dir);
    !dir.trim().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
