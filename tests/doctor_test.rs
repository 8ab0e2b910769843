mod helpers;

use helpers::{three_note_vault, TestVault};
use notegraph::doctor::{check, Problem};
use notegraph::graph::{cache, EdgeRef};
use notegraph::notes::relations::RelationType;

fn run(vault: &TestVault) -> notegraph::doctor::Report {
    check(vault.root(), &vault.cache_path(), &[])
}

#[test]
fn fresh_index_is_healthy() {
    let vault = three_note_vault();
    vault.index();
    let report = run(&vault);
    assert!(report.ok, "unexpected problems: {:?}", report.problems);
}

#[test]
fn empty_root_is_healthy_after_index() {
    let vault = TestVault::new();
    let outcome = vault.index();
    assert_eq!(outcome.node_count, 0);
    assert!(run(&vault).ok);
}

#[test]
fn missing_cache_is_reported() {
    let vault = three_note_vault();
    let report = run(&vault);
    assert!(!report.ok);
    assert!(matches!(report.problems[..], [Problem::CacheMissing { .. }]));
}

#[test]
fn edge_to_nonexistent_node_is_dangling() {
    let vault = three_note_vault();
    vault.index();

    let mut graph = cache::load(&vault.cache_path()).unwrap();
    graph
        .nodes
        .get_mut("a.md")
        .unwrap()
        .out_edges
        .push(EdgeRef {
            neighbor: "ghost.md".into(),
            relation_type: RelationType::Supports,
            confidence: 0.5,
        });
    cache::save(&graph, &vault.cache_path()).unwrap();

    let report = run(&vault);
    assert!(!report.ok);
    assert!(report.problems.iter().any(|p| matches!(
        p,
        Problem::DanglingEdge { node, neighbor, declared_in: None, .. }
            if node == "a.md" && neighbor == "ghost.md"
    )));
}

#[test]
fn recorded_unresolved_relation_is_dangling() {
    let vault = TestVault::new();
    vault.write("a.md", "# A\nDEPENDS_ON(A->Ghost)[0.5]\n");
    vault.index();

    let report = run(&vault);
    assert!(!report.ok);
    assert!(matches!(
        &report.problems[..],
        [Problem::DanglingEdge { declared_in: Some(note), neighbor, .. }]
            if note == "a.md" && neighbor == "Ghost"
    ));
}

#[test]
fn tampered_counts_are_reported() {
    let vault = three_note_vault();
    vault.index();

    let mut graph = cache::load(&vault.cache_path()).unwrap();
    graph.metadata.edge_count = 7;
    cache::save(&graph, &vault.cache_path()).unwrap();

    let report = run(&vault);
    assert!(report.problems.iter().any(|p| matches!(
        p,
        Problem::CountMismatch { field, recorded: 7, actual: 1 } if field == "edge_count"
    )));
}

#[test]
fn one_sided_adjacency_is_reported() {
    let vault = three_note_vault();
    vault.index();

    let mut graph = cache::load(&vault.cache_path()).unwrap();
    graph.nodes.get_mut("b.md").unwrap().in_edges.clear();
    cache::save(&graph, &vault.cache_path()).unwrap();

    let report = run(&vault);
    assert!(report
        .problems
        .iter()
        .any(|p| matches!(p, Problem::AdjacencyMismatch { .. })));
}

#[test]
fn unknown_schema_version_is_reported_not_upgraded() {
    let vault = three_note_vault();
    vault.index();
    let path = vault.cache_path();
    let mut value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    value["schema_version"] = 42.into();
    let tampered = serde_json::to_string(&value).unwrap();
    std::fs::write(&path, &tampered).unwrap();

    let report = run(&vault);
    assert!(matches!(report.problems[..], [Problem::SchemaMismatch { .. }]));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), tampered);
}

#[test]
fn edited_note_makes_cache_stale() {
    let vault = three_note_vault();
    vault.index();
    vault.write("c.md", "# Tomatoes\n\nNow with basil.\n");

    let report = run(&vault);
    assert!(matches!(report.problems[..], [Problem::StaleCache { .. }]));

    vault.index();
    assert!(run(&vault).ok);
}

#[test]
fn doctor_never_writes() {
    let vault = three_note_vault();
    vault.index();
    let before = std::fs::read(vault.cache_path()).unwrap();
    vault.write("new.md", "# New\n");
    run(&vault);
    assert_eq!(std::fs::read(vault.cache_path()).unwrap(), before);
}
