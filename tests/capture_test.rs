mod helpers;

use chrono::Utc;
use helpers::TestVault;
use notegraph::capture::{capture, default_target};
use notegraph::graph::cache;
use notegraph::workspace;
use std::path::Path;

#[test]
fn captured_relations_index_once() {
    let vault = TestVault::new();
    workspace::init(vault.root()).unwrap();
    vault.write("10_Projects/latency.md", "# Latency Spike\n");
    vault.write("10_Projects/timeout.md", "# API Timeout\n");

    let now = Utc::now();
    let target = default_target(vault.root(), "00_Inbox", now);
    let report = capture(
        vault.root(),
        &target,
        "Deploy went sideways. CAUSED_BY(Latency Spike->API Timeout)[0.7]",
        now,
    )
    .unwrap();
    assert_eq!(report.relations.len(), 1);
    assert!(report.note.starts_with("00_Inbox/"));

    let content = std::fs::read_to_string(&target).unwrap();
    assert!(content.contains("```relations\nCAUSED_BY(Latency Spike->API Timeout)[0.7]\n```"));

    // Inline text and the relations block declare the same edge.
    let outcome = vault.index();
    assert_eq!(outcome.edge_count, 1);
    assert!(outcome.dangling.is_empty());
    let graph = cache::load(&vault.cache_path()).unwrap();
    let node = graph.node("10_Projects/latency.md").unwrap();
    assert_eq!(node.out_edges[0].neighbor, "10_Projects/timeout.md");
}

#[test]
fn capture_into_named_note_appends() {
    let vault = TestVault::new();
    vault.write("journal.md", "# Journal\n\nExisting entry.");
    let now = Utc::now();
    capture(vault.root(), Path::new("journal.md"), "New thought.", now).unwrap();

    let content = vault.read("journal.md");
    assert!(content.starts_with("# Journal\n\nExisting entry.\n\n## Capture @"));
    assert!(content.ends_with("New thought.\n"));
}
