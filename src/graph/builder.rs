//! Graph construction from a note store.
//!
//! Relation endpoints are labels, not ids: `CAUSED_BY(API Timeout->Latency)`
//! names notes by title or file stem. [`Resolver`] maps labels to node ids;
//! anything it cannot map unambiguously becomes a [`DanglingEdge`].

use chrono::Utc;
use std::collections::{BTreeMap, HashMap};

use super::{DanglingEdge, EdgeRef, Graph, GraphMetadata, Node, CACHE_SCHEMA_VERSION};
use crate::error::{ParseWarning, Result};
use crate::notes::relations::{Relation, RelationType};
use crate::notes::{Fingerprint, Note, NoteStore};
use crate::text::TermPolicy;

/// In-memory build result, before persistence.
#[derive(Debug)]
pub struct BuildOutcome {
    pub graph: Graph,
    pub warnings: Vec<ParseWarning>,
}

/// Read every note under `store` and assemble the graph.
///
/// Fails only on I/O errors; malformed annotations are returned as warnings
/// and unresolved relations are recorded in [`Graph::dangling`].
pub fn build_graph(store: &NoteStore, policy: TermPolicy) -> Result<BuildOutcome> {
    let mut notes = Vec::new();
    let mut fingerprint = Fingerprint::new();
    for note in store.scan() {
        let note = note?;
        fingerprint.push(&note.id, &note.digest);
        notes.push(note);
    }
    tracing::debug!(notes = notes.len(), root = %store.root().display(), "scan complete");

    let mut warnings = Vec::new();
    let mut nodes: BTreeMap<String, Node> = BTreeMap::new();
    for note in &notes {
        warnings.extend(note.warnings.iter().cloned());
        nodes.insert(
            note.id.clone(),
            Node {
                id: note.id.clone(),
                title: note.title.clone(),
                tags: note.tags.clone(),
                terms: policy.term_counts(&note.searchable_text()),
                out_edges: Vec::new(),
                in_edges: Vec::new(),
            },
        );
    }
    for w in &warnings {
        tracing::warn!(note = %w.note, line = w.line, "{w}");
    }

    let resolver = Resolver::new(&notes);
    let (accepted, dangling) = resolve_relations(&notes, &resolver);

    // BTreeMap order makes adjacency lists deterministic.
    for ((from, to, relation_type), confidence) in &accepted {
        if let Some(node) = nodes.get_mut(from) {
            node.out_edges.push(EdgeRef {
                neighbor: to.clone(),
                relation_type: relation_type.clone(),
                confidence: *confidence,
            });
        }
        if let Some(node) = nodes.get_mut(to) {
            node.in_edges.push(EdgeRef {
                neighbor: from.clone(),
                relation_type: relation_type.clone(),
                confidence: *confidence,
            });
        }
    }

    let graph = Graph {
        schema_version: CACHE_SCHEMA_VERSION,
        metadata: GraphMetadata {
            generated_at: Utc::now(),
            notes_root: store.root().display().to_string(),
            fingerprint: fingerprint.finish(),
            note_count: notes.len(),
            node_count: nodes.len(),
            edge_count: accepted.len(),
            term_policy: policy,
        },
        nodes,
        dangling,
    };

    Ok(BuildOutcome { graph, warnings })
}

type EdgeKey = (String, String, RelationType);

/// Split declared relations into accepted edges and dangling records.
///
/// Duplicate `(from, to, type)` triples collapse into one edge carrying the
/// highest declared confidence.
fn resolve_relations(
    notes: &[Note],
    resolver: &Resolver,
) -> (BTreeMap<EdgeKey, f64>, Vec<DanglingEdge>) {
    let mut accepted: BTreeMap<EdgeKey, f64> = BTreeMap::new();
    let mut dangling = Vec::new();

    for note in notes {
        for relation in &note.relations {
            let from = resolver.resolve(&relation.from);
            let to = resolver.resolve(&relation.to);
            match (from, to) {
                (Some(from), Some(to)) => {
                    let key = (from.to_string(), to.to_string(), relation.relation_type.clone());
                    accepted
                        .entry(key)
                        .and_modify(|c| {
                            tracing::debug!(
                                relation = %relation.to_annotation(),
                                note = %note.id,
                                "duplicate relation merged"
                            );
                            *c = c.max(relation.confidence);
                        })
                        .or_insert(relation.confidence);
                }
                (from, to) => {
                    tracing::warn!(
                        note = %note.id,
                        relation = %relation.to_annotation(),
                        from_resolved = from.is_some(),
                        to_resolved = to.is_some(),
                        "dangling relation"
                    );
                    dangling.push(dangling_edge(note, relation, from, to));
                }
            }
        }
    }

    (accepted, dangling)
}

fn dangling_edge(
    note: &Note,
    relation: &Relation,
    from: Option<&str>,
    to: Option<&str>,
) -> DanglingEdge {
    DanglingEdge {
        declared_in: note.id.clone(),
        relation_type: relation.relation_type.clone(),
        from: relation.from.clone(),
        to: relation.to.clone(),
        confidence: relation.confidence,
        from_resolved: from.map(str::to_string),
        to_resolved: to.map(str::to_string),
    }
}

/// Case-insensitive label → node id lookup.
///
/// Tried in order, stopping at the first level with any hit: exact id, id
/// without `.md`, file stem, title. Two or more hits at the deciding level is
/// ambiguous and resolves to nothing.
struct Resolver {
    levels: [HashMap<String, Vec<String>>; 4],
}

impl Resolver {
    fn new(notes: &[Note]) -> Self {
        let mut levels: [HashMap<String, Vec<String>>; 4] = Default::default();
        for note in notes {
            let keys = [
                note.id.to_lowercase(),
                note.id
                    .strip_suffix(".md")
                    .unwrap_or(&note.id)
                    .to_lowercase(),
                note.stem().to_lowercase(),
                note.title.trim().to_lowercase(),
            ];
            for (level, key) in levels.iter_mut().zip(keys) {
                let ids = level.entry(key).or_default();
                if !ids.contains(&note.id) {
                    ids.push(note.id.clone());
                }
            }
        }
        Self { levels }
    }

    fn resolve(&self, label: &str) -> Option<&str> {
        let key = label.trim().to_lowercase();
        for level in &self.levels {
            match level.get(&key).map(Vec::as_slice) {
                Some([id]) => return Some(id.as_str()),
                Some(ids) if ids.len() > 1 => {
                    tracing::debug!(label, candidates = ids.len(), "ambiguous relation endpoint");
                    return None;
                }
                _ => {}
            }
        }
        None
    }
}
