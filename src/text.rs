//! Tokenization shared by indexing and recall.
//!
//! Both sides must agree on normalization or lexical scores stop being
//! comparable, so the active [`TermPolicy`] is persisted with the graph and
//! recall tokenizes queries with the graph's policy rather than its own.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}_]+(?:-[\p{L}\p{N}_]+)*").unwrap());

const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "he",
    "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "me", "more", "my",
    "no", "not", "of", "on", "or", "our", "out", "she", "so", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "to", "up", "was", "we", "were", "what",
    "when", "which", "who", "will", "with", "would", "you", "your",
];

/// Normalization rules applied to note text and queries alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPolicy {
    /// Drop common English function words.
    pub remove_stop_words: bool,
}

impl Default for TermPolicy {
    fn default() -> Self {
        Self {
            remove_stop_words: true,
        }
    }
}

impl TermPolicy {
    /// Case-folded tokens in order of appearance.
    pub fn tokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        TOKEN_RE
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(move |t| !(self.remove_stop_words && is_stop_word(t)))
    }

    /// Term frequency map.
    pub fn term_counts(&self, text: &str) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for token in self.tokens(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct tokens.
    pub fn token_set(&self, text: &str) -> BTreeSet<String> {
        self.tokens(text).collect()
    }
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

/// Truncate to at most `max_chars` characters, appending "..." if cut.
pub fn truncate_preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        None => content.to_string(),
        Some((end, _)) => format!("{}...", content[..end].trim_end()),
    }
}
