//! Local-first knowledge runtime: markdown notes to a term/relation graph with hybrid recall.
//!
//! Notes are plain markdown files under a notes root. Relations between notes
//! are declared inline as `TYPE(from->to)[confidence]`, for example
//! `CAUSED_BY(API Timeout->Latency Spike)[0.8]`. Indexing turns the tree into
//! a [`graph::Graph`] persisted as a JSON cache; recall ranks nodes against a
//! query by term overlap corroborated by related notes.
//!
//! | Relation type | Structural weight |
//! |---------------|-------------------|
//! | `RELATES_TO`, `CAUSED_BY`, `DEPENDS_ON`, `PART_OF`, `SUPPORTS`, `SUPERSEDES` | 1.0 |
//! | `CONTRADICTS` | 0.5 |
//! | anything else | 0.75 |
//!
//! # Architecture
//!
//! - **Reading**: [`notes::NoteStore`] walks the root in sorted order and parses
//!   titles, tags, relations and lifecycle markers
//! - **Indexing**: [`graph::index`] resolves relation endpoints, builds adjacency
//!   and atomically replaces the cache
//! - **Recall**: [`recall::recall`] combines lexical and structural scores with
//!   deterministic tie-breaking
//! - **Maintenance**: [`doctor::check`] validates a cache read-only;
//!   [`lifecycle::run`] consolidates, decays and archives inbox notes
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`notes`] — Note store reader, frontmatter, relation and marker parsing
//! - [`graph`] — Graph construction and the JSON cache
//! - [`recall`] — Hybrid recall and the retrieval benchmark
//! - [`doctor`] — Cache consistency and freshness checks
//! - [`lifecycle`] — Age-based consolidate, decay and archive
//! - [`capture`] — Append text and relations to a note
//! - [`workspace`] — Notes workspace scaffolding

pub mod capture;
pub mod config;
pub mod doctor;
pub mod error;
pub mod fsutil;
pub mod graph;
pub mod lifecycle;
pub mod notes;
pub mod recall;
pub mod text;
pub mod workspace;

pub use error::{Error, ParseWarning, Result};
