//! The term/relation graph and its persisted cache.
//!
//! A [`Graph`] is rebuilt from scratch on every index run; there is no
//! incremental merge with a previous cache. [`index`] is the write path:
//! scan, build, then atomically replace the cache file.

pub mod builder;
pub mod cache;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::{ParseWarning, Result};
use crate::notes::relations::RelationType;
use crate::notes::NoteStore;
use crate::text::TermPolicy;

/// Bumped whenever the serialized shape changes incompatibly.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// One adjacency entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRef {
    pub neighbor: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub confidence: f64,
}

/// Graph vertex, 1:1 with an indexed note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Case-folded term frequencies over title and body.
    pub terms: BTreeMap<String, u32>,
    #[serde(default)]
    pub out_edges: Vec<EdgeRef>,
    #[serde(default)]
    pub in_edges: Vec<EdgeRef>,
}

impl Node {
    /// Distinct neighbors across both directions, excluding self-loops.
    pub fn neighbors(&self) -> impl Iterator<Item = &EdgeRef> {
        self.out_edges
            .iter()
            .chain(self.in_edges.iter())
            .filter(move |e| e.neighbor != self.id)
    }
}

/// A declared relation with at least one endpoint that did not resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DanglingEdge {
    /// Note whose text declared the relation.
    pub declared_in: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub from: String,
    pub to: String,
    pub confidence: f64,
    pub from_resolved: Option<String>,
    pub to_resolved: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub generated_at: DateTime<Utc>,
    /// Canonical notes root the graph was built from.
    pub notes_root: String,
    /// See [`crate::notes::Fingerprint`].
    pub fingerprint: String,
    pub note_count: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub term_policy: TermPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub schema_version: u32,
    pub metadata: GraphMetadata,
    pub nodes: BTreeMap<String, Node>,
    #[serde(default)]
    pub dangling: Vec<DanglingEdge>,
}

impl Graph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }
}

/// Result of a full index run.
#[derive(Debug, Serialize)]
pub struct IndexOutcome {
    pub cache_path: PathBuf,
    pub note_count: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub dangling: Vec<DanglingEdge>,
    pub warnings: Vec<ParseWarning>,
}

/// Scan `store`, build the graph and atomically replace the cache at `cache_path`.
pub fn index(store: &NoteStore, cache_path: &Path, policy: TermPolicy) -> Result<IndexOutcome> {
    let outcome = builder::build_graph(store, policy)?;
    cache::save(&outcome.graph, cache_path)?;

    let meta = &outcome.graph.metadata;
    tracing::info!(
        notes = meta.note_count,
        nodes = meta.node_count,
        edges = meta.edge_count,
        dangling = outcome.graph.dangling.len(),
        warnings = outcome.warnings.len(),
        cache = %cache_path.display(),
        "index complete"
    );

    Ok(IndexOutcome {
        cache_path: cache_path.to_path_buf(),
        note_count: meta.note_count,
        node_count: meta.node_count,
        edge_count: meta.edge_count,
        dangling: outcome.graph.dangling,
        warnings: outcome.warnings,
    })
}
