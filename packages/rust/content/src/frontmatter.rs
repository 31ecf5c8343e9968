//! Lightweight `key: value` frontmatter parser.
//!
//! This is deliberately not YAML: only the five known keys are read, list
//! values may be written inline (`[a, b]` or `a, b`) or as `- item` lines,
//! and anything unrecognized is skipped. Parsing never fails.

use articlepress_shared::ArticleMeta;
use tracing::debug;

/// Frontmatter delimiter line.
const DELIMITER: &str = "---";

/// An article split into metadata and markdown body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArticle {
    pub meta: ArticleMeta,
    /// Markdown after the frontmatter block (the whole text if there is none).
    pub body: String,
    /// Whether a delimited frontmatter block was found.
    pub has_frontmatter: bool,
}

#[derive(Debug, Clone, Copy)]
enum ListKey {
    Tags,
    References,
}

/// Split `text` into frontmatter metadata and body.
///
/// A block exists only when the first line is `---` and a later line is
/// `---`; otherwise the metadata is empty and the body is the full text.
pub fn parse_frontmatter(text: &str) -> ParsedArticle {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();

    let Some(first) = lines.first() else {
        return ParsedArticle::default();
    };
    if first.trim() != DELIMITER {
        return ParsedArticle {
            body: text.to_string(),
            ..Default::default()
        };
    }

    let Some(close) = lines[1..].iter().position(|l| l.trim() == DELIMITER) else {
        debug!("frontmatter opened but never closed, treating as body");
        return ParsedArticle {
            body: text.to_string(),
            ..Default::default()
        };
    };
    let close = close + 1;

    let meta = parse_block(&lines[1..close]);
    let body = lines[close + 1..]
        .iter()
        .skip_while(|l| l.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");

    ParsedArticle {
        meta,
        body,
        has_frontmatter: true,
    }
}

fn parse_block(lines: &[&str]) -> ArticleMeta {
    let mut meta = ArticleMeta::default();
    let mut open_list: Option<ListKey> = None;

    for line in lines {
        let trimmed = line.trim();

        if let Some(key) = open_list {
            if let Some(item) = trimmed.strip_prefix('-') {
                let item = strip_quotes(item.trim());
                if !item.is_empty() {
                    list_mut(&mut meta, key).push(item.to_string());
                }
                continue;
            }
            open_list = None;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "title" => meta.title = strip_quotes(value).to_string(),
            "description" => meta.description = strip_quotes(value).to_string(),
            "category" => meta.category = strip_quotes(value).to_string(),
            "tags" | "references" => {
                let list_key = if key == "tags" {
                    ListKey::Tags
                } else {
                    ListKey::References
                };
                if value.is_empty() {
                    open_list = Some(list_key);
                } else {
                    *list_mut(&mut meta, list_key) = parse_inline_list(value);
                }
            }
            _ => {}
        }
    }

    meta
}

fn list_mut(meta: &mut ArticleMeta, key: ListKey) -> &mut Vec<String> {
    match key {
        ListKey::Tags => &mut meta.tags,
        ListKey::References => &mut meta.references,
    }
}

/// `["a", 'b', c]` or `a, b, c` → `[a, b, c]`; empty entries are dropped.
fn parse_inline_list(value: &str) -> Vec<String> {
    value
        .trim_matches(|c| c == '[' || c == ']')
        .split(',')
        .map(|item| strip_quotes(item.trim()))
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches(|c| c == '"' || c == '\'').trim()
}
