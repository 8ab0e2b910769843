//! Notes workspace scaffolding.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// PARA folders plus the tool's own working directories.
pub const WORKSPACE_DIRS: &[&str] = &[
    "00_Inbox",
    "10_Projects",
    "20_Areas",
    "30_Resources",
    "99_Archives",
    ".neural/cache",
    ".neural/exports",
];

#[derive(Debug, Serialize)]
pub struct InitReport {
    pub root: PathBuf,
    pub created: Vec<String>,
    pub existing: Vec<String>,
}

/// Create the workspace layout under `root`. Existing directories are left as they are.
pub fn init(root: &Path) -> Result<InitReport> {
    let mut report = InitReport {
        root: root.to_path_buf(),
        created: Vec::new(),
        existing: Vec::new(),
    };
    for dir in WORKSPACE_DIRS {
        let target = root.join(dir);
        if target.is_dir() {
            report.existing.push(dir.to_string());
            continue;
        }
        std::fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        report.created.push(dir.to_string());
    }
    tracing::info!(
        root = %root.display(),
        created = report.created.len(),
        "workspace initialized"
    );
    Ok(report)
}
