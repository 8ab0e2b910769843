use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::{LifecycleContext, LifecycleMode, LifecycleReport};
use crate::error::{Error, Result};
use crate::fsutil;
use crate::notes::marker::is_marker_line;
use crate::notes::{relative_id, Note};
use crate::text::truncate_preview;

const SUMMARY_PREFIX: &str = "consolidated";
const EXCERPT_CHARS: usize = 80;

/// Summarize old inbox notes into one file per calendar month of mtime.
///
/// Existing summary entries are kept and merged by note id, so notes that
/// have since been archived stay listed. Nothing is written when the merged
/// content matches what is already on disk.
pub fn consolidate(ctx: &LifecycleContext) -> Result<LifecycleReport> {
    let cfg = ctx.config();
    let mut report = LifecycleReport::new(LifecycleMode::Consolidate);

    // month → id → entry line
    let mut buckets: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for note in ctx.notes_in(&cfg.inbox_dir)? {
        report.processed += 1;
        if note.age_days < cfg.consolidate_min_age_days as f64 {
            continue;
        }
        let bytes = std::fs::read(&note.path).map_err(|e| Error::io(&note.path, e))?;
        let parsed = Note::from_bytes(note.id.clone(), note.path.clone(), &bytes, note.modified_at);
        buckets
            .entry(note.modified_at.format("%Y-%m").to_string())
            .or_default()
            .insert(note.id.clone(), entry_line(&parsed, note.modified_at));
    }

    let archive_root = ctx.archive_root();
    for (month, fresh) in buckets {
        let path = archive_root.join(format!("{SUMMARY_PREFIX}-{month}.md"));
        let existing = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(Error::io(&path, e)),
        };

        let mut entries = parse_entries(&existing);
        for (id, line) in fresh {
            if entries.get(&id) != Some(&line) {
                report.touched += 1;
                report.details.push(format!("summarized {id}"));
                entries.insert(id, line);
            }
        }

        let rendered = render_summary(&month, &entries);
        if rendered != existing {
            fsutil::write_atomic(&path, rendered.as_bytes())?;
            tracing::debug!(path = %path.display(), entries = entries.len(), "summary written");
        }
        report.summary_paths.push(
            relative_id(&path, ctx.notes_root()).unwrap_or_else(|| path.display().to_string()),
        );
    }
    Ok(report)
}

/// ``- `id` | YYYY-MM-DD | title | excerpt``
fn entry_line(note: &Note, modified: DateTime<Utc>) -> String {
    format!(
        "- `{}` | {} | {} | {}",
        note.id,
        modified.format("%Y-%m-%d"),
        sanitize(&note.title),
        sanitize(&excerpt(note)),
    )
}

/// First prose line of the body: not a heading, not a marker, not blank.
fn excerpt(note: &Note) -> String {
    note.body
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("```") && !is_marker_line(l))
        .map(|l| truncate_preview(l, EXCERPT_CHARS))
        .unwrap_or_default()
}

fn sanitize(field: &str) -> String {
    field.replace('|', "/").replace(['\r', '\n'], " ")
}

/// Entries of an existing summary keyed by the id between the first backticks.
fn parse_entries(summary: &str) -> BTreeMap<String, String> {
    summary
        .lines()
        .filter_map(|line| {
            let rest = line.strip_prefix("- `")?;
            let (id, _) = rest.split_once('`')?;
            Some((id.to_string(), line.to_string()))
        })
        .collect()
}

fn render_summary(month: &str, entries: &BTreeMap<String, String>) -> String {
    let mut out = format!("# Consolidated inbox notes {month}\n\n");
    for line in entries.values() {
        out.push_str(line);
        out.push('\n');
    }
    out
}
