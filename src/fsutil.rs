//! Crash-safe file writes: temp file in the target directory, fsync, rename.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{Error, Result};

/// Replace `path` with `contents` atomically.
///
/// The temp file is created next to the target so the final rename never
/// crosses a filesystem. A crash before the rename leaves the previous file
/// (or no file) at `path`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = parent_dir(path);
    std::fs::create_dir_all(&parent).map_err(|e| Error::io(&parent, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".notegraph-")
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(|e| Error::io(&parent, e))?;
    tmp.write_all(contents).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "atomic write complete");
    Ok(())
}

/// Like [`write_atomic`], then restores the target's modification time.
///
/// Lifecycle markers are bookkeeping, not edits: a note's age must not reset
/// because a marker was appended to it.
pub fn write_atomic_keep_mtime(path: &Path, contents: &[u8], modified: SystemTime) -> Result<()> {
    write_atomic(path, contents)?;
    let file = std::fs::File::options()
        .write(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    file.set_modified(modified).map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Last-modified time of a file.
pub fn modified_time(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| Error::io(path, e))
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn write_atomic_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deeper/file.json");

        write_atomic(&target, b"first").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "first");

        write_atomic(&target, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "second");

        // No temp files left behind
        let leftovers: Vec<_> = std::fs::read_dir(target.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn keep_mtime_restores_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("note.md");
        std::fs::write(&target, "# Note\n").unwrap();

        let old = SystemTime::now() - Duration::from_secs(40 * 86_400);
        write_atomic_keep_mtime(&target, b"# Note\nmore\n", old).unwrap();

        let after = modified_time(&target).unwrap();
        let drift = after
            .duration_since(old)
            .unwrap_or_else(|e| e.duration());
        assert!(drift < Duration::from_secs(2));
    }
}
