//! CLI `recall` and `benchmark` commands.

use anyhow::{Context, Result};
use std::path::Path;

use notegraph::config::NotegraphConfig;
use notegraph::recall::{self, benchmark, RecallParams};

/// Command-line overrides for the configured retrieval settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecallOverrides {
    pub top_k: Option<usize>,
    pub lexical_weight: Option<f64>,
    pub structural_weight: Option<f64>,
}

impl RecallOverrides {
    fn apply(self, mut params: RecallParams) -> RecallParams {
        if let Some(k) = self.top_k {
            params.top_k = k;
        }
        if let Some(w) = self.lexical_weight {
            params.lexical_weight = w;
        }
        if let Some(w) = self.structural_weight {
            params.structural_weight = w;
        }
        params
    }
}

pub fn recall(
    config: &NotegraphConfig,
    query: &str,
    overrides: RecallOverrides,
    json: bool,
) -> Result<()> {
    let params = overrides.apply(config.recall_params());
    let cache_path = config.resolved_cache_path();
    let graph = recall::load_graph(&cache_path)?;
    let hits = recall::recall(&graph, query, &params)?;

    if json {
        return super::print_json(&hits);
    }
    if hits.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s)\n", hits.len());
    for hit in &hits {
        println!(
            "  {}. {} (score: {:.4}, lexical: {:.3}, structural: {:.3})",
            hit.rank, hit.title, hit.score, hit.lexical, hit.structural
        );
        println!("     {}", hit.id);
    }
    Ok(())
}

pub fn benchmark(
    config: &NotegraphConfig,
    dataset: &Path,
    overrides: RecallOverrides,
    json: bool,
) -> Result<()> {
    let params = overrides.apply(config.recall_params());
    let graph = recall::load_graph(&config.resolved_cache_path())?;
    let queries = benchmark::load_dataset(dataset)
        .with_context(|| format!("cannot load dataset {}", dataset.display()))?;
    let report = benchmark::run_benchmark(&graph, &queries, &params)?;

    if json {
        return super::print_json(&report);
    }

    println!("Benchmark: {} queries", report.queries_total);
    println!("{}", "=".repeat(40));
    println!("  hit@1:        {:.3}", report.hit_at_1);
    println!("  hit@3:        {:.3}", report.hit_at_3);
    println!("  hit@5:        {:.3}", report.hit_at_5);
    println!("  avg latency:  {:.2} ms", report.avg_latency_ms);
    println!();
    for q in &report.queries {
        match (&q.hit_rank, &q.hit_id) {
            (Some(rank), Some(id)) => println!("  #{rank:<3} {}  ->  {id}", q.query),
            _ => println!("  miss  {}", q.query),
        }
    }
    Ok(())
}
