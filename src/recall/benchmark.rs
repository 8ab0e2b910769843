//! Retrieval quality benchmark over a labelled query set.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

use super::{recall, RecallParams};
use crate::error::{Error, Result};
use crate::graph::Graph;

/// One labelled query. `expected` holds note ids or titles; any match counts.
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkQuery {
    pub query: String,
    pub expected: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct QuerySummary {
    pub query: String,
    /// 1-based rank of the first expected hit.
    pub hit_rank: Option<usize>,
    pub hit_id: Option<String>,
    pub latency_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct BenchmarkReport {
    pub queries_total: usize,
    pub hit_at_1: f64,
    pub hit_at_3: f64,
    pub hit_at_5: f64,
    pub avg_latency_ms: f64,
    pub queries: Vec<QuerySummary>,
}

/// Read a JSON array of [`BenchmarkQuery`].
pub fn load_dataset(path: &Path) -> Result<Vec<BenchmarkQuery>> {
    let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_slice(&data).map_err(|e| {
        Error::Usage(format!("invalid benchmark dataset {}: {e}", path.display()))
    })
}

/// Run every query through [`recall`] and aggregate hit rates.
pub fn run_benchmark(
    graph: &Graph,
    dataset: &[BenchmarkQuery],
    params: &RecallParams,
) -> Result<BenchmarkReport> {
    let mut queries = Vec::with_capacity(dataset.len());
    let mut total_latency = 0.0;

    for entry in dataset {
        let start = Instant::now();
        let hits = recall(graph, &entry.query, params)?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        total_latency += latency_ms;

        let first = hits.iter().find(|hit| {
            entry.expected.iter().any(|want| {
                want.eq_ignore_ascii_case(&hit.id) || want.eq_ignore_ascii_case(&hit.title)
            })
        });
        queries.push(QuerySummary {
            query: entry.query.clone(),
            hit_rank: first.map(|h| h.rank),
            hit_id: first.map(|h| h.id.clone()),
            latency_ms,
        });
    }

    let total = dataset.len();
    let rate = |k: usize| {
        if total == 0 {
            return 0.0;
        }
        let hits = queries
            .iter()
            .filter(|q| q.hit_rank.is_some_and(|r| r <= k))
            .count();
        hits as f64 / total as f64
    };

    let report = BenchmarkReport {
        queries_total: total,
        hit_at_1: rate(1),
        hit_at_3: rate(3),
        hit_at_5: rate(5),
        avg_latency_ms: if total == 0 {
            0.0
        } else {
            total_latency / total as f64
        },
        queries,
    };
    tracing::info!(
        queries = total,
        hit_at_1 = report.hit_at_1,
        hit_at_5 = report.hit_at_5,
        "benchmark complete"
    );
    Ok(report)
}
