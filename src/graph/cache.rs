//! JSON cache file: the hand-off between the indexer and its readers.

use std::path::Path;

use super::{Graph, CACHE_SCHEMA_VERSION};
use crate::error::{Error, Result};
use crate::fsutil;

/// Serialize `graph` and atomically replace whatever is at `path`.
pub fn save(graph: &Graph, path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(graph).map_err(|source| Error::CacheFormat {
        path: path.to_path_buf(),
        source,
    })?;
    fsutil::write_atomic(path, &json)
}

/// Load a cache for reading. The schema version is checked before the full
/// shape so an old cache reports a version mismatch rather than a parse error.
pub fn load(path: &Path) -> Result<Graph> {
    if !path.exists() {
        return Err(Error::CacheMissing(path.to_path_buf()));
    }
    let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let value: serde_json::Value =
        serde_json::from_slice(&data).map_err(|source| Error::CacheFormat {
            path: path.to_path_buf(),
            source,
        })?;
    check_schema_version(&value)?;

    serde_json::from_value(value).map_err(|source| Error::CacheFormat {
        path: path.to_path_buf(),
        source,
    })
}

/// Verify the `schema_version` field of a raw cache document.
pub fn check_schema_version(value: &serde_json::Value) -> Result<()> {
    let found = value
        .get("schema_version")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0);
    if found != u64::from(CACHE_SCHEMA_VERSION) {
        return Err(Error::SchemaMismatch {
            found,
            expected: CACHE_SCHEMA_VERSION,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeRef, GraphMetadata, Node};
    use crate::notes::relations::RelationType;
    use crate::text::TermPolicy;
    use std::collections::BTreeMap;

    fn sample_graph() -> Graph {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "a.md".to_string(),
            Node {
                id: "a.md".into(),
                title: "A".into(),
                tags: ["ops".to_string()].into(),
                terms: [("latency".to_string(), 2)].into(),
                out_edges: vec![EdgeRef {
                    neighbor: "b.md".into(),
                    relation_type: RelationType::Other("MENTORS".into()),
                    confidence: 0.1 + 0.2,
                }],
                in_edges: vec![],
            },
        );
        nodes.insert(
            "b.md".to_string(),
            Node {
                id: "b.md".into(),
                title: "B".into(),
                tags: Default::default(),
                terms: BTreeMap::new(),
                out_edges: vec![],
                in_edges: vec![EdgeRef {
                    neighbor: "a.md".into(),
                    relation_type: RelationType::Other("MENTORS".into()),
                    confidence: 0.1 + 0.2,
                }],
            },
        );
        Graph {
            schema_version: CACHE_SCHEMA_VERSION,
            metadata: GraphMetadata {
                generated_at: chrono::Utc::now(),
                notes_root: "/vault".into(),
                fingerprint: "abc".into(),
                note_count: 2,
                node_count: 2,
                edge_count: 1,
                term_policy: TermPolicy::default(),
            },
            nodes,
            dangling: vec![],
        }
    }

    #[test]
    fn save_then_load_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".neural/graph.json");
        let graph = sample_graph();
        save(&graph, &path).unwrap();
        assert_eq!(load(&path).unwrap(), graph);
    }

    #[test]
    fn load_missing_is_cache_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::CacheMissing(_)));
    }

    #[test]
    fn load_rejects_other_schema_versions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        std::fs::write(&path, r#"{"schema_version": 99, "nodes": {}}"#).unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { found: 99, .. }));
    }
}
