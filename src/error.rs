//! Error and warning types shared by every core operation.
//!
//! Terminal failures are [`Error`] values: the operation aborts and reports a
//! single reason. Per-item parse problems are [`ParseWarning`]s: they are
//! collected and returned alongside a successful result.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Terminal failure of a core operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The notes root does not exist or is not a directory.
    #[error("notes root not found: {}", .0.display())]
    NotesRootMissing(PathBuf),

    /// A file or directory could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed (permissions, broken entries).
    #[error("failed to walk notes tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// No cache file at the expected location.
    #[error("graph cache not found: {}. Run `notegraph index` first.", .0.display())]
    CacheMissing(PathBuf),

    /// The cache file is not a JSON document of the expected shape.
    #[error("graph cache {} is malformed: {source}", path.display())]
    CacheFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The cache was written by an incompatible schema version.
    #[error("graph cache schema version {found} is not supported (expected {expected})")]
    SchemaMismatch { found: u64, expected: u32 },

    /// An exclude pattern in the configuration is not a valid glob.
    #[error("invalid exclude pattern: {0}")]
    Glob(#[from] globset::Error),

    /// Invalid parameter supplied by the caller; raised before any I/O.
    #[error("invalid usage: {0}")]
    Usage(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A skipped annotation inside one note. Never aborts a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseWarning {
    /// Note id the warning belongs to (empty for free-standing text such as capture input).
    pub note: String,
    /// 1-based line number of the offending annotation.
    pub line: usize,
    #[serde(flatten)]
    pub kind: ParseWarningKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarningKind {
    /// `TYPE(...)[...]` that does not follow `TYPE(from->to)[confidence]`.
    MalformedRelation { raw: String, reason: String },
    /// Confidence parsed but outside `[0.0, 1.0]`.
    ConfidenceOutOfRange { raw: String, value: f64 },
    /// A lifecycle marker line that could not be parsed.
    MalformedMarker { raw: String },
    /// The file is not valid UTF-8; undecodable bytes were replaced with U+FFFD.
    InvalidUtf8 { byte_offset: usize },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ParseWarningKind::MalformedRelation { raw, reason } => {
                write!(f, "{}:{}: malformed relation `{raw}` ({reason})", self.note, self.line)
            }
            ParseWarningKind::ConfidenceOutOfRange { raw, value } => write!(
                f,
                "{}:{}: relation `{raw}` has confidence {value} outside [0, 1]",
                self.note, self.line
            ),
            ParseWarningKind::MalformedMarker { raw } => {
                write!(f, "{}:{}: malformed lifecycle marker `{raw}`", self.note, self.line)
            }
            ParseWarningKind::InvalidUtf8 { byte_offset } => write!(
                f,
                "{}:{}: invalid UTF-8 at byte {byte_offset}, decoded lossily",
                self.note, self.line
            ),
        }
    }
}
