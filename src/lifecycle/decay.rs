use super::{LifecycleContext, LifecycleMode, LifecycleReport};
use crate::error::{Error, Result};
use crate::fsutil;
use crate::notes::marker::{is_marker_line, LifecycleMarker};

/// `1 - 0.5^(age / half_life)`: 0 for a fresh note, 0.5 at one half-life,
/// approaching 1. Strictly increasing in age.
pub fn decay_score(age_days: f64, half_life_days: f64) -> f64 {
    1.0 - 0.5_f64.powf(age_days.max(0.0) / half_life_days)
}

/// Stamp a lifecycle marker on inbox notes older than `decay_min_age_days`.
pub fn decay(ctx: &LifecycleContext) -> Result<LifecycleReport> {
    let cfg = ctx.config();
    let today = ctx.now().date_naive();
    let mut report = LifecycleReport::new(LifecycleMode::Decay);

    for note in ctx.notes_in(&cfg.inbox_dir)? {
        report.processed += 1;
        if note.age_days < cfg.decay_min_age_days as f64 {
            continue;
        }
        let marker = LifecycleMarker::new(
            today,
            decay_score(note.age_days, cfg.decay_half_life_days),
        );

        let bytes = std::fs::read(&note.path).map_err(|e| Error::io(&note.path, e))?;
        // Rewriting a lossily decoded note would destroy its original bytes.
        let Ok(content) = String::from_utf8(bytes) else {
            tracing::warn!(note = %note.id, "not valid UTF-8, decay marker skipped");
            report
                .details
                .push(format!("skipped {}: not valid UTF-8", note.id));
            continue;
        };
        let Some(updated) = with_marker(&content, &marker) else {
            continue;
        };
        fsutil::write_atomic_keep_mtime(&note.path, updated.as_bytes(), note.modified)?;

        tracing::debug!(note = %note.id, score = marker.decay_score, "decay marker written");
        report.touched += 1;
        report
            .details
            .push(format!("marked {} decay_score={:.3}", note.id, marker.decay_score));
    }
    Ok(report)
}

/// `content` with every marker line replaced by a single trailing `marker`,
/// or `None` if that is already exactly what the note holds.
fn with_marker(content: &str, marker: &LifecycleMarker) -> Option<String> {
    let line = marker.render();
    let existing: Vec<&str> = content.lines().filter(|l| is_marker_line(l)).collect();
    if let [only] = existing.as_slice() {
        if only.trim() == line {
            return None;
        }
    }

    let kept: Vec<&str> = content.lines().filter(|l| !is_marker_line(l)).collect();
    let mut out = kept.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&line);
    out.push('\n');
    Some(out)
}
