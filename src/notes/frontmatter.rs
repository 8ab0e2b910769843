//! Minimal YAML frontmatter and heading extraction.
//!
//! Only the keys the graph uses (`title`, `tags`) are read; everything else in
//! the block is ignored.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static INLINE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)#([A-Za-z][A-Za-z0-9_/-]*)").unwrap());

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub tags: Vec<String>,
}

/// Split content into (frontmatter block, body). Body is the whole content if
/// there is no closed `---` block at the very top.
pub fn split(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }
    (None, content)
}

pub fn parse(yaml: &str) -> Frontmatter {
    let mut fm = Frontmatter::default();
    let mut in_tag_list = false;

    for line in yaml.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Block-style list items under `tags:`
        if in_tag_list {
            if let Some(item) = trimmed.strip_prefix("- ") {
                push_tag(&mut fm.tags, item);
                continue;
            }
            in_tag_list = false;
        }

        if let Some((key, value)) = trimmed.split_once(':') {
            let value = value.trim();
            match key.trim() {
                "title" if !value.is_empty() => fm.title = Some(unquote(value)),
                "tags" => {
                    if value.starts_with('[') {
                        for item in parse_inline_list(value) {
                            push_tag(&mut fm.tags, &item);
                        }
                    } else if value.is_empty() {
                        in_tag_list = true;
                    } else {
                        for item in value.split(',') {
                            push_tag(&mut fm.tags, item);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fm
}

/// First `# ` heading in the body.
pub fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|rest| rest.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// `#tag` occurrences in body text, case-folded. Headings (`# `) never match.
pub fn inline_tags(body: &str) -> BTreeSet<String> {
    INLINE_TAG_RE
        .captures_iter(body)
        .map(|c| c[1].to_lowercase())
        .collect()
}

fn push_tag(tags: &mut Vec<String>, raw: &str) {
    let tag = unquote(raw.trim()).trim_start_matches('#').to_lowercase();
    if !tag.is_empty() && !tags.contains(&tag) {
        tags.push(tag);
    }
}

fn parse_inline_list(value: &str) -> Vec<String> {
    value
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|s| unquote(s.trim()))
        .filter(|s| !s.is_empty())
        .collect()
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}
