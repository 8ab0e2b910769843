//! Note store reader: walks a notes root and yields parsed notes.
//!
//! [`NoteStore::scan`] is lazy and restartable: call it again for a fresh
//! pass. Notes come out in sorted path order so two scans of an unmodified
//! tree agree, which keeps graph construction and recall reproducible.

pub mod frontmatter;
pub mod marker;
pub mod relations;

use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, ParseWarning, ParseWarningKind, Result};
use marker::LifecycleMarker;
use relations::{Relation, RelationType};

/// A single parsed markdown note.
#[derive(Debug, Clone)]
pub struct Note {
    /// Path relative to the notes root, `/`-separated.
    pub id: String,
    /// Absolute path on disk.
    pub path: PathBuf,
    pub title: String,
    /// Text after the frontmatter block.
    pub body: String,
    pub tags: BTreeSet<String>,
    /// Typed relations in order of appearance, then one `Wikilink` relation per
    /// distinct `[[target]]`.
    pub relations: Vec<Relation>,
    /// Last well-formed lifecycle marker, if any.
    pub marker: Option<LifecycleMarker>,
    pub modified: DateTime<Utc>,
    /// SHA-256 of the raw file bytes, hex-encoded.
    pub digest: String,
    pub warnings: Vec<ParseWarning>,
}

impl Note {
    /// Parse note content. Never fails: problems become warnings.
    pub fn parse(id: String, path: PathBuf, content: &str, modified: DateTime<Utc>) -> Self {
        let (yaml, body) = frontmatter::split(content);
        let fm = yaml.map(frontmatter::parse).unwrap_or_default();

        let title = fm
            .title
            .clone()
            .or_else(|| frontmatter::first_heading(body))
            .unwrap_or_else(|| file_stem(&id).to_string());

        let mut tags: BTreeSet<String> = fm.tags.into_iter().collect();
        tags.extend(frontmatter::inline_tags(body));

        let (mut relations, mut warnings) = relations::parse_relations(&id, content);
        relations.extend(
            relations::wikilink_targets(body)
                .into_iter()
                .map(|target| Relation {
                    relation_type: RelationType::Wikilink,
                    from: id.clone(),
                    to: target,
                    confidence: relations::WIKILINK_CONFIDENCE,
                }),
        );

        let mut marker = None;
        for (idx, line) in content.lines().enumerate() {
            if !marker::is_marker_line(line) {
                continue;
            }
            match LifecycleMarker::parse(line) {
                Some(m) => marker = Some(m),
                None => warnings.push(ParseWarning {
                    note: id.clone(),
                    line: idx + 1,
                    kind: ParseWarningKind::MalformedMarker {
                        raw: line.trim().to_string(),
                    },
                }),
            }
        }

        Self {
            digest: content_digest(content.as_bytes()),
            id,
            path,
            title,
            body: body.to_string(),
            tags,
            relations,
            marker,
            modified,
            warnings,
        }
    }

    /// Parse raw file bytes. Invalid UTF-8 is decoded lossily and reported as
    /// a warning; the digest always covers the original bytes.
    pub fn from_bytes(id: String, path: PathBuf, bytes: &[u8], modified: DateTime<Utc>) -> Self {
        let utf8_error = std::str::from_utf8(bytes).err();
        let content = String::from_utf8_lossy(bytes);
        let mut note = Self::parse(id, path, &content, modified);
        if let Some(err) = utf8_error {
            let offset = err.valid_up_to();
            note.digest = content_digest(bytes);
            note.warnings.push(ParseWarning {
                note: note.id.clone(),
                line: bytes[..offset].iter().filter(|b| **b == b'\n').count() + 1,
                kind: ParseWarningKind::InvalidUtf8 {
                    byte_offset: offset,
                },
            });
        }
        note
    }

    /// File name without extension.
    pub fn stem(&self) -> &str {
        file_stem(&self.id)
    }

    /// Title plus body, the input to term extraction. Lifecycle markers,
    /// relation annotations and relations fences are left out.
    pub fn searchable_text(&self) -> String {
        let mut text = String::with_capacity(self.title.len() + self.body.len() + 1);
        text.push_str(&self.title);
        text.push('\n');
        for line in self.body.lines() {
            if marker::is_marker_line(line) || line.trim() == relations::RELATIONS_FENCE {
                continue;
            }
            text.push_str(&relations::strip_annotations(line));
            text.push('\n');
        }
        text
    }
}

/// Handle on a notes root. Cheap to create; holds no open files.
#[derive(Debug, Clone)]
pub struct NoteStore {
    root: PathBuf,
    exclude: GlobSet,
}

impl NoteStore {
    /// Open a notes root. A missing root, or one that is not a directory, is fatal.
    pub fn open(root: impl AsRef<Path>, exclude: &[String]) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::NotesRootMissing(root.to_path_buf()));
        }
        let root = root.canonicalize().map_err(|e| Error::io(root, e))?;

        let mut builder = GlobSetBuilder::new();
        for pattern in exclude {
            builder.add(Glob::new(pattern)?);
        }

        Ok(Self {
            root,
            exclude: builder.build()?,
        })
    }

    /// Canonical notes root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `(id, absolute path)` for every note, in stable sorted order.
    pub fn note_paths(&self) -> impl Iterator<Item = Result<(String, PathBuf)>> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => return Some(Err(Error::Walk(e))),
                };
                if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                    return None;
                }
                let id = relative_id(entry.path(), &self.root)?;
                if self.exclude.is_match(&id) {
                    tracing::debug!(note = %id, "excluded by pattern");
                    return None;
                }
                Some(Ok((id, entry.into_path())))
            })
    }

    /// Lazily read and parse every note. An unreadable file yields an `Err`
    /// item; callers treat that as fatal for the run.
    pub fn scan(&self) -> impl Iterator<Item = Result<Note>> + '_ {
        self.note_paths().map(|item| {
            let (id, path) = item?;
            let bytes = std::fs::read(&path).map_err(|e| Error::io(&path, e))?;
            let modified = crate::fsutil::modified_time(&path)?;
            Ok(Note::from_bytes(id, path, &bytes, DateTime::<Utc>::from(modified)))
        })
    }

    /// Tree fingerprint, computed without parsing. Matches the one recorded by
    /// the indexer when nothing under the root has changed.
    pub fn fingerprint(&self) -> Result<String> {
        let mut fp = Fingerprint::new();
        for item in self.note_paths() {
            let (id, path) = item?;
            let bytes = std::fs::read(&path).map_err(|e| Error::io(&path, e))?;
            fp.push(&id, &content_digest(&bytes));
        }
        Ok(fp.finish())
    }
}

/// Running SHA-256 over ordered `(note id, content digest)` pairs.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: &str, digest: &str) {
        self.hasher.update(id.as_bytes());
        self.hasher.update([0u8]);
        self.hasher.update(digest.as_bytes());
        self.hasher.update(b"\n");
    }

    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// `/`-joined path of `path` relative to `base`.
pub fn relative_id(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    Some(
        rel.iter()
            .map(|os| os.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
    )
}

pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn file_stem(id: &str) -> &str {
    let name = id.rsplit('/').next().unwrap_or(id);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}
