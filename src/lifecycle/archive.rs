use super::{LifecycleContext, LifecycleMode, LifecycleReport};
use crate::error::{Error, Result};

/// Move notes older than `older_than_days` from each archive source into
/// `<archive_dir>/<relative path>`. An existing target is never overwritten.
pub fn archive(ctx: &LifecycleContext, older_than_days: u64) -> Result<LifecycleReport> {
    let cfg = ctx.config();
    let archive_root = ctx.archive_root();
    let archive_prefix = format!("{}/", cfg.archive_dir.trim_end_matches('/'));
    let mut report = LifecycleReport::new(LifecycleMode::Archive);

    for source in &cfg.archive_sources {
        for note in ctx.notes_in(source)? {
            if note.id.starts_with(&archive_prefix) {
                continue;
            }
            report.processed += 1;
            if note.age_days < older_than_days as f64 {
                continue;
            }

            let target = archive_root.join(&note.id);
            let target_id = format!("{archive_prefix}{}", note.id);
            if target.exists() {
                tracing::warn!(note = %note.id, target = %target_id, "archive target exists, skipping");
                report
                    .details
                    .push(format!("skipped {}: {target_id} already exists", note.id));
                continue;
            }
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            std::fs::rename(&note.path, &target).map_err(|e| Error::io(&note.path, e))?;

            report.touched += 1;
            report.details.push(format!("moved {} -> {target_id}", note.id));
        }
    }
    Ok(report)
}
