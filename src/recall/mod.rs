//! Hybrid recall: lexical term overlap corroborated by graph structure.
//!
//! # Scoring
//!
//! 1. Tokenize the query with the graph's recorded [`TermPolicy`].
//! 2. `lexical = coverage × (1 + density) / 2`, in `[0, 1]`. `coverage` is the
//!    idf-weighted share of distinct query tokens present in the node.
//!    `density` is `d / (1 + d)` where `d` sums `tf / len × idf` over the
//!    matched tokens, so repeated mentions break ties between equal coverage.
//!    `idf = 1 + ln((N + 1) / (df + 1))`.
//! 3. `structural = s / (1 + s)`, where `s` sums, over distinct lexically
//!    relevant neighbors, the strongest edge weight to that neighbor
//!    (`confidence × type weight`). In `[0, 1)`.
//! 4. `score = lexical_weight × lexical + structural_weight × structural`.
//! 5. Drop nodes whose weighted score is not positive, sort by score descending
//!    then id ascending, truncate to `top_k`.
//!
//! [`TermPolicy`]: crate::text::TermPolicy

pub mod benchmark;

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::{Error, Result};
use crate::graph::{cache, Graph, Node};

/// Caller-supplied recall knobs.
#[derive(Debug, Clone, Copy)]
pub struct RecallParams {
    pub top_k: usize,
    pub lexical_weight: f64,
    pub structural_weight: f64,
}

impl Default for RecallParams {
    fn default() -> Self {
        Self {
            top_k: 10,
            lexical_weight: 1.0,
            structural_weight: 0.5,
        }
    }
}

impl RecallParams {
    fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Usage("top_k must be at least 1".into()));
        }
        for (name, w) in [
            ("lexical_weight", self.lexical_weight),
            ("structural_weight", self.structural_weight),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::Usage(format!(
                    "{name} must be a finite, non-negative number (got {w})"
                )));
            }
        }
        Ok(())
    }
}

/// One ranked result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecallHit {
    /// 1-based position in the result list.
    pub rank: usize,
    pub id: String,
    pub title: String,
    pub score: f64,
    pub lexical: f64,
    pub structural: f64,
}

/// Load a cache for recall.
pub fn load_graph(path: &Path) -> Result<Graph> {
    cache::load(path)
}

/// Rank graph nodes against `query`.
///
/// Parameters are validated before any scoring. An empty graph or a query
/// with no usable tokens returns an empty list.
pub fn recall(graph: &Graph, query: &str, params: &RecallParams) -> Result<Vec<RecallHit>> {
    params.validate()?;

    let query_tokens = graph.metadata.term_policy.token_set(query);
    if query_tokens.is_empty() || graph.is_empty() {
        return Ok(Vec::new());
    }

    let idf = inverse_document_frequency(graph, &query_tokens);
    let lexical: HashMap<&str, f64> = graph
        .nodes
        .values()
        .map(|node| (node.id.as_str(), lexical_score(&idf, node)))
        .collect();

    let mut scored: Vec<RecallHit> = graph
        .nodes
        .values()
        .filter_map(|node| {
            let lex = lexical[node.id.as_str()];
            let structural = structural_score(node, &lexical);
            let score = params.lexical_weight * lex + params.structural_weight * structural;
            if score <= 0.0 {
                return None;
            }
            Some(RecallHit {
                rank: 0,
                id: node.id.clone(),
                title: node.title.clone(),
                score,
                lexical: lex,
                structural,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    scored.truncate(params.top_k);
    for (idx, hit) in scored.iter_mut().enumerate() {
        hit.rank = idx + 1;
    }

    tracing::debug!(
        query,
        tokens = query_tokens.len(),
        results = scored.len(),
        "recall complete"
    );
    Ok(scored)
}

/// `idf` per distinct query token. Tokens absent from every node get the
/// largest weight, so they still count against coverage.
fn inverse_document_frequency<'q>(
    graph: &Graph,
    query_tokens: &'q BTreeSet<String>,
) -> Vec<(&'q str, f64)> {
    let total = graph.nodes.len() as f64;
    query_tokens
        .iter()
        .map(|token| {
            let df = graph
                .nodes
                .values()
                .filter(|n| n.terms.contains_key(token))
                .count() as f64;
            (token.as_str(), 1.0 + ((total + 1.0) / (df + 1.0)).ln())
        })
        .collect()
}

fn lexical_score(idf: &[(&str, f64)], node: &Node) -> f64 {
    let length: u32 = node.terms.values().sum();
    let mut matched = 0.0;
    let mut total = 0.0;
    let mut density = 0.0;
    for (token, weight) in idf {
        total += weight;
        if let Some(&tf) = node.terms.get(*token) {
            matched += weight;
            density += f64::from(tf) / f64::from(length) * weight;
        }
    }
    if matched <= 0.0 {
        return 0.0;
    }
    let coverage = matched / total;
    coverage * (1.0 + density / (1.0 + density)) / 2.0
}

/// Saturating sum of corroboration from lexically relevant neighbors.
fn structural_score(node: &Node, lexical: &HashMap<&str, f64>) -> f64 {
    let mut strongest: HashMap<&str, f64> = HashMap::new();
    for edge in node.neighbors() {
        let relevant = lexical
            .get(edge.neighbor.as_str())
            .is_some_and(|l| *l > 0.0);
        if !relevant {
            continue;
        }
        let weight = edge.confidence * edge.relation_type.structural_weight();
        let slot = strongest.entry(edge.neighbor.as_str()).or_insert(0.0);
        *slot = slot.max(weight);
    }
    let sum: f64 = strongest.values().sum();
    sum / (1.0 + sum)
}
