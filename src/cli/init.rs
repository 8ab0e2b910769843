//! CLI `init` command — scaffold a notes workspace.

use anyhow::Result;
use std::path::Path;

use notegraph::workspace;

pub fn init(root: &Path, json: bool) -> Result<()> {
    let report = workspace::init(root)?;

    if json {
        return super::print_json(&report);
    }

    println!("Workspace ready at {}", report.root.display());
    for dir in &report.created {
        println!("  created  {dir}");
    }
    if report.created.is_empty() {
        println!("  (all directories already existed)");
    }
    Ok(())
}
