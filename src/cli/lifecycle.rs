//! CLI `lifecycle` command — consolidate, decay or archive inbox notes.

use anyhow::{Context, Result};
use chrono::Utc;

use notegraph::config::NotegraphConfig;
use notegraph::lifecycle::{self, LifecycleContext, LifecycleMode};

pub fn lifecycle(
    config: &NotegraphConfig,
    mode: LifecycleMode,
    older_than_days: Option<u64>,
    json: bool,
) -> Result<()> {
    let root = config.resolved_notes_root();
    let ctx = LifecycleContext::new(&root, config.lifecycle.clone(), Utc::now())
        .with_context(|| format!("cannot run lifecycle on {}", root.display()))?;
    let report = lifecycle::run(&ctx, mode, older_than_days)?;

    if json {
        return super::print_json(&report);
    }

    println!(
        "Lifecycle {}: {} processed, {} touched",
        report.mode, report.processed, report.touched
    );
    for line in &report.details {
        println!("  {line}");
    }
    for path in &report.summary_paths {
        println!("  summary: {path}");
    }
    Ok(())
}
