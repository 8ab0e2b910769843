//! Read-only consistency and freshness check over a persisted graph cache.
//!
//! [`check`] never writes and never fails: every issue it finds becomes a
//! [`Problem`] in the returned [`Report`].

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::graph::{cache, Graph};
use crate::notes::relations::RelationType;
use crate::notes::NoteStore;

#[derive(Debug, Serialize)]
pub struct Report {
    pub ok: bool,
    pub notes_root: PathBuf,
    pub cache_path: PathBuf,
    pub problems: Vec<Problem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
    CacheMissing {
        path: PathBuf,
    },
    CacheUnreadable {
        path: PathBuf,
        error: String,
    },
    SchemaMismatch {
        detail: String,
    },
    CountMismatch {
        field: String,
        recorded: usize,
        actual: usize,
    },
    AdjacencyMismatch {
        detail: String,
    },
    DanglingEdge {
        node: String,
        neighbor: String,
        relation_type: RelationType,
        /// Set for relations the indexer could not resolve.
        declared_in: Option<String>,
    },
    NotesRootUnreadable {
        path: PathBuf,
        error: String,
    },
    NotesRootMismatch {
        recorded: String,
        actual: String,
    },
    StaleCache {
        recorded: String,
        actual: String,
    },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CacheMissing { path } => write!(f, "cache missing: {}", path.display()),
            Self::CacheUnreadable { path, error } => {
                write!(f, "cache unreadable: {}: {error}", path.display())
            }
            Self::SchemaMismatch { detail } => write!(f, "schema mismatch: {detail}"),
            Self::CountMismatch {
                field,
                recorded,
                actual,
            } => write!(f, "{field} records {recorded} but graph has {actual}"),
            Self::AdjacencyMismatch { detail } => write!(f, "adjacency mismatch: {detail}"),
            Self::DanglingEdge {
                node,
                neighbor,
                relation_type,
                declared_in,
            } => {
                write!(f, "dangling {relation_type} edge {node} -> {neighbor}")?;
                if let Some(note) = declared_in {
                    write!(f, " (declared in {note})")?;
                }
                Ok(())
            }
            Self::NotesRootUnreadable { path, error } => {
                write!(f, "notes root unreadable: {}: {error}", path.display())
            }
            Self::NotesRootMismatch { recorded, actual } => {
                write!(f, "cache was built from {recorded}, not {actual}")
            }
            Self::StaleCache { .. } => write!(f, "notes changed since last index"),
        }
    }
}

/// Inspect the cache at `cache_path` against the notes under `notes_root`.
///
/// `exclude` must match the patterns the indexer used, otherwise the
/// freshness check compares different trees.
pub fn check(notes_root: &Path, cache_path: &Path, exclude: &[String]) -> Report {
    let mut problems = Vec::new();

    if let Some(graph) = load_for_check(cache_path, &mut problems) {
        check_counts(&graph, &mut problems);
        check_adjacency(&graph, &mut problems);
        check_dangling(&graph, &mut problems);
        check_freshness(&graph, notes_root, exclude, &mut problems);
    }

    for problem in &problems {
        tracing::debug!(%problem, "doctor problem");
    }
    Report {
        ok: problems.is_empty(),
        notes_root: notes_root.to_path_buf(),
        cache_path: cache_path.to_path_buf(),
        problems,
    }
}

/// Load the cache, converting every failure into at most one problem.
fn load_for_check(cache_path: &Path, problems: &mut Vec<Problem>) -> Option<Graph> {
    if !cache_path.exists() {
        problems.push(Problem::CacheMissing {
            path: cache_path.to_path_buf(),
        });
        return None;
    }
    let data = match std::fs::read(cache_path) {
        Ok(data) => data,
        Err(e) => {
            problems.push(Problem::CacheUnreadable {
                path: cache_path.to_path_buf(),
                error: e.to_string(),
            });
            return None;
        }
    };
    let value: serde_json::Value = match serde_json::from_slice(&data) {
        Ok(v) => v,
        Err(e) => {
            problems.push(Problem::SchemaMismatch {
                detail: format!("not valid JSON: {e}"),
            });
            return None;
        }
    };
    if let Err(e) = cache::check_schema_version(&value) {
        problems.push(Problem::SchemaMismatch {
            detail: e.to_string(),
        });
        return None;
    }
    match serde_json::from_value::<Graph>(value) {
        Ok(graph) => Some(graph),
        Err(e) => {
            problems.push(Problem::SchemaMismatch {
                detail: format!("unexpected shape: {e}"),
            });
            None
        }
    }
}

fn check_counts(graph: &Graph, problems: &mut Vec<Problem>) {
    let meta = &graph.metadata;
    let out_total: usize = graph.nodes.values().map(|n| n.out_edges.len()).sum();
    let checks = [
        ("node_count", meta.node_count, graph.nodes.len()),
        ("note_count", meta.note_count, meta.node_count),
        ("edge_count", meta.edge_count, out_total),
    ];
    for (field, recorded, actual) in checks {
        if recorded != actual {
            problems.push(Problem::CountMismatch {
                field: field.to_string(),
                recorded,
                actual,
            });
        }
    }
}

fn check_adjacency(graph: &Graph, problems: &mut Vec<Problem>) {
    for (key, node) in &graph.nodes {
        if key != &node.id {
            problems.push(Problem::AdjacencyMismatch {
                detail: format!("node keyed {key} carries id {}", node.id),
            });
        }
    }
    let out_total: usize = graph.nodes.values().map(|n| n.out_edges.len()).sum();
    let in_total: usize = graph.nodes.values().map(|n| n.in_edges.len()).sum();
    if out_total != in_total {
        problems.push(Problem::AdjacencyMismatch {
            detail: format!("{out_total} outgoing entries but {in_total} incoming"),
        });
    }
}

fn check_dangling(graph: &Graph, problems: &mut Vec<Problem>) {
    for node in graph.nodes.values() {
        for edge in node.out_edges.iter().chain(&node.in_edges) {
            if !graph.nodes.contains_key(&edge.neighbor) {
                problems.push(Problem::DanglingEdge {
                    node: node.id.clone(),
                    neighbor: edge.neighbor.clone(),
                    relation_type: edge.relation_type.clone(),
                    declared_in: None,
                });
            }
        }
    }
    for d in &graph.dangling {
        problems.push(Problem::DanglingEdge {
            node: d.from_resolved.clone().unwrap_or_else(|| d.from.clone()),
            neighbor: d.to_resolved.clone().unwrap_or_else(|| d.to.clone()),
            relation_type: d.relation_type.clone(),
            declared_in: Some(d.declared_in.clone()),
        });
    }
}

fn check_freshness(graph: &Graph, notes_root: &Path, exclude: &[String], problems: &mut Vec<Problem>) {
    let unreadable = |e: Error| Problem::NotesRootUnreadable {
        path: notes_root.to_path_buf(),
        error: e.to_string(),
    };
    let store = match NoteStore::open(notes_root, exclude) {
        Ok(store) => store,
        Err(e) => {
            problems.push(unreadable(e));
            return;
        }
    };

    let actual_root = store.root().display().to_string();
    if actual_root != graph.metadata.notes_root {
        problems.push(Problem::NotesRootMismatch {
            recorded: graph.metadata.notes_root.clone(),
            actual: actual_root,
        });
    }

    match store.fingerprint() {
        Ok(actual) if actual != graph.metadata.fingerprint => {
            problems.push(Problem::StaleCache {
                recorded: graph.metadata.fingerprint.clone(),
                actual,
            });
        }
        Ok(_) => {}
        Err(e) => problems.push(unreadable(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cache_is_single_problem() {
        let dir = tempfile::tempdir().unwrap();
        let report = check(dir.path(), &dir.path().join("graph.json"), &[]);
        assert!(!report.ok);
        assert_eq!(report.problems.len(), 1);
        assert!(matches!(report.problems[0], Problem::CacheMissing { .. }));
    }

    #[test]
    fn garbage_cache_is_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("graph.json");
        std::fs::write(&cache, "not json").unwrap();
        let report = check(dir.path(), &cache, &[]);
        assert!(matches!(report.problems[..], [Problem::SchemaMismatch { .. }]));
    }

    #[test]
    fn problem_serializes_with_kind_tag() {
        let p = Problem::CountMismatch {
            field: "edge_count".into(),
            recorded: 3,
            actual: 2,
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["kind"], "count_mismatch");
        assert_eq!(json["recorded"], 3);
    }
}
