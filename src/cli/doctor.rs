//! CLI `doctor` command — validate the graph cache and print a health report.

use anyhow::Result;

use notegraph::config::NotegraphConfig;
use notegraph::doctor::{self, Report};

/// Run cache diagnostics. Returns whether the cache is healthy.
pub fn doctor(config: &NotegraphConfig, json: bool) -> Result<bool> {
    let report = doctor::check(
        &config.resolved_notes_root(),
        &config.resolved_cache_path(),
        &config.notes.exclude,
    );

    if json {
        super::print_json(&report)?;
    } else {
        print_report(&report);
    }
    Ok(report.ok)
}

fn print_report(report: &Report) {
    println!("Notegraph Health Report");
    println!("=======================");
    println!();
    println!("Notes root:        {}", report.notes_root.display());
    println!("Cache:             {}", report.cache_path.display());
    println!();

    if report.ok {
        println!("Status:            OK");
        return;
    }

    println!("Status:            {} problem(s)", report.problems.len());
    for problem in &report.problems {
        println!("  - {problem}");
    }
    println!();
    println!("Run `notegraph index` to rebuild the cache.");
}
