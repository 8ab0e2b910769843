//! CLI `index` command — rebuild the graph cache from the notes tree.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use notegraph::config::NotegraphConfig;
use notegraph::graph;
use notegraph::notes::NoteStore;

pub fn index(config: &NotegraphConfig, json: bool) -> Result<()> {
    let root = config.resolved_notes_root();
    let cache_path = config.resolved_cache_path();
    let store = NoteStore::open(&root, &config.notes.exclude)
        .with_context(|| format!("cannot index {}", root.display()))?;

    let spinner = if json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{spinner} {msg} ({elapsed})")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };
    spinner.set_message(format!("indexing {}", store.root().display()));
    let outcome = graph::index(&store, &cache_path, config.term_policy());
    spinner.finish_and_clear();
    let outcome = outcome.context("index failed")?;

    if json {
        return super::print_json(&outcome);
    }

    println!("Indexed {}", store.root().display());
    println!("  Notes:      {}", outcome.note_count);
    println!("  Nodes:      {}", outcome.node_count);
    println!("  Edges:      {}", outcome.edge_count);
    println!("  Cache:      {}", outcome.cache_path.display());

    if !outcome.dangling.is_empty() {
        println!();
        println!("Unresolved relations ({}):", outcome.dangling.len());
        for d in &outcome.dangling {
            let missing = match (&d.from_resolved, &d.to_resolved) {
                (None, None) => "both endpoints",
                (None, Some(_)) => "source",
                _ => "target",
            };
            println!(
                "  {}: {}({}->{}) [{missing} not found]",
                d.declared_in, d.relation_type, d.from, d.to
            );
        }
    }
    if !outcome.warnings.is_empty() {
        println!();
        println!("Warnings ({}):", outcome.warnings.len());
        for w in &outcome.warnings {
            println!("  {w}");
        }
    }
    Ok(())
}
