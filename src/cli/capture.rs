//! CLI `capture` command — append text and its relations to a note.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::io::Read;
use std::path::{Path, PathBuf};

use notegraph::capture;
use notegraph::config::NotegraphConfig;

/// Capture text from `--input`, `--file`, or stdin (in that order).
pub fn capture(
    config: &NotegraphConfig,
    input: Option<String>,
    file: Option<PathBuf>,
    note: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let text = read_input(input, file.as_deref())?;
    let root = config.resolved_notes_root();
    let now = Utc::now();
    let target =
        note.unwrap_or_else(|| capture::default_target(&root, &config.lifecycle.inbox_dir, now));

    let report = capture::capture(&root, &target, &text, now)?;

    if json {
        return super::print_json(&report);
    }

    println!("Captured to {}", report.note);
    println!("  Relations:  {}", report.relations.len());
    for relation in &report.relations {
        println!("    {}", relation.to_annotation());
    }
    for warning in &report.warnings {
        println!("  skipped: {warning}");
    }
    Ok(())
}

fn read_input(input: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = input {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read capture input {}", path.display()));
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read capture input from stdin")?;
    if text.trim().is_empty() {
        bail!("nothing to capture: pass --input, --file, or pipe text on stdin");
    }
    Ok(text)
}
