#![allow(dead_code)]

use notegraph::graph::{self, IndexOutcome};
use notegraph::notes::NoteStore;
use notegraph::text::TermPolicy;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;

/// A throwaway notes root with the default cache location.
pub struct TestVault {
    dir: TempDir,
}

impl TestVault {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn cache_path(&self) -> PathBuf {
        self.root().join(".neural/graph.json")
    }

    /// Write a note at `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.root().join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.root().join(rel).exists()
    }

    pub fn store(&self) -> NoteStore {
        NoteStore::open(self.root(), &[]).unwrap()
    }

    /// Index with default settings into [`Self::cache_path`].
    pub fn index(&self) -> IndexOutcome {
        graph::index(&self.store(), &self.cache_path(), TermPolicy::default()).unwrap()
    }
}

/// Set a file's modification time.
pub fn set_mtime(path: &Path, when: SystemTime) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(when).unwrap();
}

pub fn mtime(path: &Path) -> SystemTime {
    std::fs::metadata(path).unwrap().modified().unwrap()
}

/// Three notes: A declares `RELATES_TO(A->B)[0.9]`, B has no relations and
/// C shares no terms with either. "latency" appears in A and B only.
pub fn three_note_vault() -> TestVault {
    let vault = TestVault::new();
    vault.write(
        "a.md",
        "# Checkout latency\n\nLatency regression after deploy.\n\nRELATES_TO(A->B)[0.9]\n",
    );
    vault.write("b.md", "# Latency budget\n\nLatency budget for checkout.\n");
    vault.write("c.md", "# Tomatoes\n\nWatering schedule for the garden.\n");
    vault
}
