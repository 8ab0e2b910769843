//! Append free-form text to a note, with its relations restated in a block.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, ParseWarning, Result};
use crate::fsutil;
use crate::notes::relations::{parse_relations, Relation, RELATIONS_FENCE};
use crate::notes::relative_id;

const NEW_NOTE_HEADER: &str = "# Auto capture\n";

#[derive(Debug, Serialize)]
pub struct CaptureReport {
    /// Target note id relative to the notes root.
    pub note: String,
    pub appended_at: DateTime<Utc>,
    pub relations: Vec<Relation>,
    pub warnings: Vec<ParseWarning>,
}

/// Where a capture lands when no target is given: `<inbox>/<YYYY-MM-DD>-auto.md`.
pub fn default_target(notes_root: &Path, inbox_dir: &str, now: DateTime<Utc>) -> PathBuf {
    notes_root
        .join(inbox_dir)
        .join(format!("{}-auto.md", now.format("%Y-%m-%d")))
}

/// Append `text` as a `## Capture @<time>` section of `target`.
///
/// Relative targets resolve against `notes_root`; the result must stay inside
/// it. The note is created if missing and rewritten atomically otherwise.
pub fn capture(
    notes_root: &Path,
    target: &Path,
    text: &str,
    now: DateTime<Utc>,
) -> Result<CaptureReport> {
    let body = text.trim_end();
    if body.trim().is_empty() {
        return Err(Error::Usage("nothing to capture: input is empty".into()));
    }
    if !notes_root.is_dir() {
        return Err(Error::NotesRootMissing(notes_root.to_path_buf()));
    }
    let root = notes_root
        .canonicalize()
        .map_err(|e| Error::io(notes_root, e))?;
    let relative = if target.is_absolute() {
        target
            .strip_prefix(notes_root)
            .or_else(|_| target.strip_prefix(&root))
            .ok()
    } else {
        Some(target)
    };
    let relative = relative
        .filter(|rel| {
            rel.components().next().is_some()
                && rel.components().all(|c| matches!(c, Component::Normal(_)))
        })
        .ok_or_else(|| {
            Error::Usage(format!(
                "capture target {} is outside the notes root",
                target.display()
            ))
        })?;
    let target = root.join(relative);
    let note = relative_id(&target, &root).unwrap_or_else(|| relative.display().to_string());

    let (relations, warnings) = parse_relations("", body);

    let mut content = match std::fs::read_to_string(&target) {
        Ok(existing) => existing,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => NEW_NOTE_HEADER.to_string(),
        Err(e) => return Err(Error::io(&target, e)),
    };
    if !content.is_empty() && !content.ends_with("\n\n") {
        content.push_str(if content.ends_with('\n') { "\n" } else { "\n\n" });
    }
    content.push_str(&render_entry(body, &relations, now));
    fsutil::write_atomic(&target, content.as_bytes())?;

    tracing::info!(note = %note, relations = relations.len(), "capture appended");
    Ok(CaptureReport {
        note,
        appended_at: now,
        relations,
        warnings,
    })
}

fn render_entry(body: &str, relations: &[Relation], now: DateTime<Utc>) -> String {
    let mut entry = format!(
        "## Capture @{}\n\n{body}\n",
        now.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if !relations.is_empty() {
        entry.push('\n');
        entry.push_str(RELATIONS_FENCE);
        entry.push('\n');
        for relation in relations {
            entry.push_str(&relation.to_annotation());
            entry.push('\n');
        }
        entry.push_str("```\n");
    }
    entry
}
