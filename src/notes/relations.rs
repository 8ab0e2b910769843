//! Typed relation annotations: `TYPE(from->to)[confidence]`.
//!
//! Candidates are matched loosely first, then parsed strictly, so a
//! half-written annotation produces a warning instead of vanishing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::error::{ParseWarning, ParseWarningKind};

/// Anything shaped like `TYPE(...)[...]` on a single line, with optional `REL:` prefix.
static CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\bREL:)?\b(?P<type>[A-Z][A-Z0-9_]*)\((?P<inner>[^()\n]*)\)\[(?P<conf>[^\]\n]*)\]")
        .unwrap()
});

/// `[[target]]`, `[[target#heading]]`, `[[target|alias]]` and combinations.
static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[(?P<target>[^\]|#\n]*)(?:#[^\]|\n]*)?(?:\|[^\]\n]*)?\]\]").unwrap()
});

/// Opening line of the fenced block capture writes accepted relations into.
pub const RELATIONS_FENCE: &str = "```relations";

/// Confidence given to every `[[wikilink]]` edge.
pub const WIKILINK_CONFIDENCE: f64 = 1.0;

/// Relation tag. Known types are matched exhaustively by scoring; anything
/// else is carried verbatim.
///
/// `RELATED_TO` is accepted as a spelling of [`RelationType::RelatesTo`] and is
/// written back as `RELATES_TO`. An `Other` holding a known tag does not
/// survive a round trip; it comes back as the known variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationType {
    RelatesTo,
    CausedBy,
    DependsOn,
    PartOf,
    Supports,
    Contradicts,
    Supersedes,
    /// A `[[wikilink]]` reference from one note to another.
    Wikilink,
    Other(String),
}

impl RelationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::RelatesTo => "RELATES_TO",
            Self::CausedBy => "CAUSED_BY",
            Self::DependsOn => "DEPENDS_ON",
            Self::PartOf => "PART_OF",
            Self::Supports => "SUPPORTS",
            Self::Contradicts => "CONTRADICTS",
            Self::Supersedes => "SUPERSEDES",
            Self::Wikilink => "WIKILINK",
            Self::Other(tag) => tag,
        }
    }

    /// How much an edge of this type corroborates its endpoints during recall.
    pub fn structural_weight(&self) -> f64 {
        match self {
            Self::RelatesTo
            | Self::CausedBy
            | Self::DependsOn
            | Self::PartOf
            | Self::Supports
            | Self::Supersedes
            | Self::Wikilink => 1.0,
            Self::Contradicts => 0.5,
            Self::Other(_) => 0.75,
        }
    }
}

impl From<String> for RelationType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "RELATES_TO" | "RELATED_TO" => Self::RelatesTo,
            "CAUSED_BY" => Self::CausedBy,
            "DEPENDS_ON" => Self::DependsOn,
            "PART_OF" => Self::PartOf,
            "SUPPORTS" => Self::Supports,
            "CONTRADICTS" => Self::Contradicts,
            "SUPERSEDES" => Self::Supersedes,
            "WIKILINK" => Self::Wikilink,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for RelationType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<RelationType> for String {
    fn from(rt: RelationType) -> Self {
        rt.as_str().to_string()
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge declaration found in note text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub from: String,
    pub to: String,
    /// In `[0.0, 1.0]`; enforced at parse time.
    pub confidence: f64,
}

impl Relation {
    /// Render back into annotation syntax.
    pub fn to_annotation(&self) -> String {
        format!(
            "{}({}->{})[{}]",
            self.relation_type, self.from, self.to, self.confidence
        )
    }
}

/// Extract every relation from `text`.
///
/// Malformed candidates are skipped and reported; `note` labels the warnings.
pub fn parse_relations(note: &str, text: &str) -> (Vec<Relation>, Vec<ParseWarning>) {
    let mut relations = Vec::new();
    let mut warnings = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        for cap in CANDIDATE_RE.captures_iter(line) {
            let raw = cap.get(0).map(|m| m.as_str()).unwrap_or_default();
            let warn = |kind| ParseWarning {
                note: note.to_string(),
                line: idx + 1,
                kind,
            };
            match parse_candidate(&cap["type"], &cap["inner"], &cap["conf"]) {
                Ok(relation) => relations.push(relation),
                Err(CandidateError::Syntax(reason)) => {
                    warnings.push(warn(ParseWarningKind::MalformedRelation {
                        raw: raw.to_string(),
                        reason,
                    }))
                }
                Err(CandidateError::OutOfRange(value)) => {
                    warnings.push(warn(ParseWarningKind::ConfidenceOutOfRange {
                        raw: raw.to_string(),
                        value,
                    }))
                }
            }
        }
    }

    (relations, warnings)
}

/// Link targets in `text`, trimmed, deduplicated, in order of appearance.
/// Heading and alias parts are dropped; `[[#heading]]` links to the note
/// itself and yields nothing.
pub fn wikilink_targets(text: &str) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    for cap in WIKILINK_RE.captures_iter(text) {
        let target = cap["target"].trim();
        if !target.is_empty() && !targets.iter().any(|t| t == target) {
            targets.push(target.to_string());
        }
    }
    targets
}

/// `line` with relation annotations blanked out, for term extraction.
pub fn strip_annotations(line: &str) -> Cow<'_, str> {
    CANDIDATE_RE.replace_all(line, " ")
}

enum CandidateError {
    Syntax(String),
    OutOfRange(f64),
}

fn parse_candidate(tag: &str, inner: &str, conf: &str) -> Result<Relation, CandidateError> {
    let (from, to) = inner
        .split_once("->")
        .ok_or_else(|| CandidateError::Syntax("missing `->` between endpoints".into()))?;
    let (from, to) = (from.trim(), to.trim());
    if from.is_empty() || to.is_empty() {
        return Err(CandidateError::Syntax("empty endpoint".into()));
    }
    if to.contains("->") {
        return Err(CandidateError::Syntax("more than one `->`".into()));
    }

    let confidence: f64 = conf
        .trim()
        .parse()
        .map_err(|_| CandidateError::Syntax(format!("confidence `{}` is not a number", conf.trim())))?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(CandidateError::OutOfRange(confidence));
    }

    Ok(Relation {
        relation_type: RelationType::from(tag),
        from: from.to_string(),
        to: to.to_string(),
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_typed_relations() {
        let sample =
            "REL:CAUSED_BY(API Timeout->Latency Spike)[0.82] and RELATED_TO(Demo -> Spec)[1]";
        let (relations, warnings) = parse_relations("n.md", sample);
        assert!(warnings.is_empty());
        assert_eq!(relations.len(), 2);
        assert_eq!(relations[0].relation_type, RelationType::CausedBy);
        assert_eq!(relations[0].from, "API Timeout");
        assert_eq!(relations[0].to, "Latency Spike");
        assert!((relations[0].confidence - 0.82).abs() < f64::EPSILON);
        assert_eq!(relations[1].relation_type, RelationType::RelatesTo);
        assert_eq!(relations[1].from, "Demo");
        assert_eq!(relations[1].confidence, 1.0);
    }

    #[test]
    fn unknown_types_are_kept_verbatim() {
        let (relations, _) = parse_relations("n.md", "MENTORS(alice->bob)[0.4]");
        assert_eq!(
            relations[0].relation_type,
            RelationType::Other("MENTORS".into())
        );
        assert_eq!(relations[0].relation_type.structural_weight(), 0.75);
    }

    #[test]
    fn out_of_range_confidence_is_skipped_with_warning() {
        let text = "line one\nCAUSED_BY(a->b)[1.5]\nPART_OF(b->c)[0.5]";
        let (relations, warnings) = parse_relations("x.md", text);
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].relation_type, RelationType::PartOf);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 2);
        assert!(matches!(
            warnings[0].kind,
            ParseWarningKind::ConfidenceOutOfRange { value, .. } if value == 1.5
        ));
    }

    #[test]
    fn syntax_mismatches_are_reported() {
        let text = "CAUSED_BY(a b)[0.5] DEPENDS_ON(a->)[0.5] SUPPORTS(a->b)[high]";
        let (relations, warnings) = parse_relations("x.md", text);
        assert!(relations.is_empty());
        assert_eq!(warnings.len(), 3);
        assert!(warnings
            .iter()
            .all(|w| matches!(w.kind, ParseWarningKind::MalformedRelation { .. })));
    }

    #[test]
    fn ordinary_markdown_is_not_a_candidate() {
        let text = "See [the docs](https://example.com) and call f(x)[0] in code.";
        let (relations, warnings) = parse_relations("x.md", text);
        assert!(relations.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn wikilink_targets_drop_heading_and_alias() {
        let text = "See [[b]], [[Notes/Plan#Goals|the plan]] and [[b|again]].\n[[#Local]] [[ ]]";
        assert_eq!(wikilink_targets(text), vec!["b", "Notes/Plan"]);
    }

    #[test]
    fn annotations_are_blanked_for_indexing() {
        let line = "Slow. CAUSED_BY(API Timeout->Latency Spike)[0.8] Fixed.";
        assert_eq!(strip_annotations(line), "Slow.   Fixed.");
        assert_eq!(strip_annotations("plain text"), "plain text");
    }

    #[test]
    fn related_to_spelling_normalizes() {
        assert_eq!(RelationType::from("RELATED_TO"), RelationType::RelatesTo);
        assert_eq!(RelationType::from("WIKILINK"), RelationType::Wikilink);
        let json = serde_json::to_string(&RelationType::Other("RELATED_TO".into())).unwrap();
        let back: RelationType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RelationType::RelatesTo);
    }

    #[test]
    fn relation_type_serializes_as_tag() {
        let json = serde_json::to_string(&RelationType::DependsOn).unwrap();
        assert_eq!(json, "\"DEPENDS_ON\"");
        let back: RelationType = serde_json::from_str("\"MENTORS\"").unwrap();
        assert_eq!(back, RelationType::Other("MENTORS".into()));
    }

    #[test]
    fn annotation_round_trips_through_parser() {
        let rel = Relation {
            relation_type: RelationType::Supports,
            from: "Claim".into(),
            to: "Evidence".into(),
            confidence: 0.7,
        };
        let (parsed, _) = parse_relations("x.md", &rel.to_annotation());
        assert_eq!(parsed, vec![rel]);
    }
}
