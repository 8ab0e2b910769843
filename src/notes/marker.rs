//! Lifecycle marker: `<!-- lifecycle last_reviewed=YYYY-MM-DD decay_score=N.NNN -->`.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Every line starting with this (after leading whitespace) is treated as a marker.
pub const MARKER_PREFIX: &str = "<!-- lifecycle";

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^<!-- lifecycle last_reviewed=(?P<date>\d{4}-\d{2}-\d{2}) decay_score=(?P<score>[0-9]+(?:\.[0-9]+)?) -->$",
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifecycleMarker {
    pub last_reviewed: NaiveDate,
    pub decay_score: f64,
}

impl LifecycleMarker {
    /// Build a marker, rounding the score to the precision the line carries.
    pub fn new(last_reviewed: NaiveDate, decay_score: f64) -> Self {
        Self {
            last_reviewed,
            decay_score: (decay_score * 1000.0).round() / 1000.0,
        }
    }

    /// Single-line rendering.
    pub fn render(&self) -> String {
        format!(
            "{MARKER_PREFIX} last_reviewed={} decay_score={:.3} -->",
            self.last_reviewed.format("%Y-%m-%d"),
            self.decay_score
        )
    }

    /// Parse one line. `None` if the line is not a well-formed marker.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = MARKER_RE.captures(line.trim())?;
        let last_reviewed = NaiveDate::parse_from_str(&caps["date"], "%Y-%m-%d").ok()?;
        let decay_score: f64 = caps["score"].parse().ok()?;
        Some(Self {
            last_reviewed,
            decay_score,
        })
    }
}

pub fn is_marker_line(line: &str) -> bool {
    line.trim_start().starts_with(MARKER_PREFIX)
}
