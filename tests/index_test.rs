mod helpers;

use helpers::{three_note_vault, TestVault};
use notegraph::graph::{self, builder::build_graph, cache};
use notegraph::notes::relations::RelationType;
use notegraph::notes::NoteStore;
use notegraph::text::TermPolicy;
use notegraph::Error;

#[test]
fn counts_match_graph_contents() {
    let vault = three_note_vault();
    let outcome = vault.index();

    assert_eq!(outcome.note_count, 3);
    assert_eq!(outcome.node_count, 3);
    assert_eq!(outcome.edge_count, 1);
    assert!(outcome.dangling.is_empty());

    let graph = cache::load(&vault.cache_path()).unwrap();
    let out_total: usize = graph.nodes.values().map(|n| n.out_edges.len()).sum();
    let in_total: usize = graph.nodes.values().map(|n| n.in_edges.len()).sum();
    assert_eq!(graph.metadata.node_count, graph.nodes.len());
    assert_eq!(graph.metadata.edge_count, out_total);
    assert_eq!(out_total, in_total);

    let a = graph.node("a.md").unwrap();
    assert_eq!(a.title, "Checkout latency");
    assert_eq!(a.out_edges[0].neighbor, "b.md");
    assert_eq!(a.out_edges[0].relation_type, RelationType::RelatesTo);
    assert_eq!(a.out_edges[0].confidence, 0.9);
    assert_eq!(graph.node("b.md").unwrap().in_edges[0].neighbor, "a.md");
}

#[test]
fn empty_root_yields_empty_graph() {
    let vault = TestVault::new();
    let outcome = vault.index();
    assert_eq!(
        (outcome.note_count, outcome.node_count, outcome.edge_count),
        (0, 0, 0)
    );
    assert!(cache::load(&vault.cache_path()).unwrap().is_empty());
}

#[test]
fn missing_root_is_fatal() {
    let vault = TestVault::new();
    let err = NoteStore::open(vault.root().join("nope"), &[]).unwrap_err();
    assert!(matches!(err, Error::NotesRootMissing(_)));
}

#[test]
fn unresolved_relations_are_recorded_not_invented() {
    let vault = TestVault::new();
    vault.write("a.md", "# A\nDEPENDS_ON(A->Ghost)[0.5]\nSUPPORTS(A->B)[0.4]\n");
    vault.write("b.md", "# B\n");
    let outcome = vault.index();

    assert_eq!(outcome.edge_count, 1);
    assert_eq!(outcome.dangling.len(), 1);
    assert_eq!(outcome.dangling[0].to, "Ghost");
    assert_eq!(outcome.dangling[0].declared_in, "a.md");

    let graph = cache::load(&vault.cache_path()).unwrap();
    assert_eq!(graph.nodes.len(), 2);
    assert!(graph
        .nodes
        .values()
        .flat_map(|n| n.out_edges.iter().chain(&n.in_edges))
        .all(|e| graph.nodes.contains_key(&e.neighbor)));
}

#[test]
fn relations_resolve_by_title_and_nested_path() {
    let vault = TestVault::new();
    vault.write(
        "00_Inbox/timeout.md",
        "# API Timeout\nCAUSED_BY(API Timeout->Latency Spike)[0.8]\n",
    );
    vault.write("10_Projects/spike.md", "---\ntitle: Latency Spike\n---\nbody\n");
    let outcome = vault.index();
    assert!(outcome.dangling.is_empty());
    assert_eq!(outcome.edge_count, 1);

    let graph = cache::load(&vault.cache_path()).unwrap();
    let node = graph.node("00_Inbox/timeout.md").unwrap();
    assert_eq!(node.out_edges[0].neighbor, "10_Projects/spike.md");
}

#[test]
fn malformed_annotations_warn_without_aborting() {
    let vault = TestVault::new();
    vault.write("a.md", "# A\nCAUSED_BY(A->B)[7]\nRELATES_TO(A B)[0.5]\n");
    vault.write("b.md", "# B\n");
    let outcome = vault.index();
    assert_eq!(outcome.node_count, 2);
    assert_eq!(outcome.edge_count, 0);
    assert_eq!(outcome.warnings.len(), 2);
    assert_eq!(outcome.warnings[0].note, "a.md");
    assert_eq!(outcome.warnings[0].line, 2);
}

#[test]
fn hidden_and_excluded_paths_are_skipped() {
    let vault = TestVault::new();
    vault.write("keep.md", "# Keep\n");
    vault.write(".obsidian/hidden.md", "# Hidden\n");
    vault.write("templates/daily.md", "# Template\n");
    vault.write("notes.txt", "not markdown");

    let store = NoteStore::open(vault.root(), &["templates/**".to_string()]).unwrap();
    let outcome = graph::index(&store, &vault.cache_path(), TermPolicy::default()).unwrap();
    assert_eq!(outcome.note_count, 1);
}

#[test]
fn rebuilds_are_deterministic() {
    let vault = three_note_vault();
    let first = build_graph(&vault.store(), TermPolicy::default()).unwrap().graph;
    let second = build_graph(&vault.store(), TermPolicy::default()).unwrap().graph;
    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.metadata.fingerprint, second.metadata.fingerprint);
    assert_eq!(
        first.metadata.fingerprint,
        vault.store().fingerprint().unwrap()
    );
}

#[test]
fn reindex_replaces_previous_cache() {
    let vault = three_note_vault();
    vault.index();
    std::fs::remove_file(vault.root().join("c.md")).unwrap();
    let outcome = vault.index();
    assert_eq!(outcome.node_count, 2);
    let graph = cache::load(&vault.cache_path()).unwrap();
    assert!(graph.node("c.md").is_none());

    let leftovers: Vec<_> = std::fs::read_dir(vault.root().join(".neural"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn cache_round_trips_losslessly() {
    let vault = three_note_vault();
    vault.write("d.md", "# D\nMENTORS(D->A)[0.3333333333333333]\n");
    let built = build_graph(&vault.store(), TermPolicy::default()).unwrap().graph;
    cache::save(&built, &vault.cache_path()).unwrap();
    assert_eq!(cache::load(&vault.cache_path()).unwrap(), built);
}

#[test]
fn wikilinks_become_edges_and_missing_targets_dangle() {
    let vault = TestVault::new();
    vault.write(
        "a.md",
        "# A\nSee [[b]], [[Projects/c#Goals|the plan]] and [[b|again]].\nAlso [[Nowhere]].\n",
    );
    vault.write("b.md", "# B\n");
    vault.write("Projects/c.md", "# C\n");
    let outcome = vault.index();

    assert_eq!(outcome.edge_count, 2);
    assert_eq!(outcome.dangling.len(), 1);
    assert_eq!(outcome.dangling[0].to, "Nowhere");
    assert_eq!(outcome.dangling[0].relation_type, RelationType::Wikilink);

    let graph = cache::load(&vault.cache_path()).unwrap();
    assert_eq!(graph.nodes.len(), 3);
    let a = graph.node("a.md").unwrap();
    let targets: Vec<&str> = a.out_edges.iter().map(|e| e.neighbor.as_str()).collect();
    assert_eq!(targets, vec!["Projects/c.md", "b.md"]);
    assert!(a
        .out_edges
        .iter()
        .all(|e| e.relation_type == RelationType::Wikilink && e.confidence == 1.0));
    assert_eq!(graph.node("b.md").unwrap().in_edges[0].neighbor, "a.md");
}

#[test]
fn non_utf8_note_is_indexed_with_a_warning() {
    let vault = TestVault::new();
    vault.write("a.md", "# A\n");
    std::fs::write(vault.root().join("latin1.md"), b"# Caf\xe9\nCRDT notes\n").unwrap();

    let outcome = vault.index();
    assert_eq!(outcome.node_count, 2);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].note, "latin1.md");

    let graph = cache::load(&vault.cache_path()).unwrap();
    assert!(graph.node("latin1.md").unwrap().terms.contains_key("crdt"));
    assert_eq!(graph.metadata.fingerprint, vault.store().fingerprint().unwrap());
}
