//! Cleanup passes for HTML fragments returned by the text-generation service.
//!
//! Models often wrap their answer in a markdown code fence, and sometimes
//! return a whole page even when asked for the content area only. Each
//! pass is a function `&str -> String` applied in sequence.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

/// Containers searched (in order) when the reply is a complete document.
const CONTENT_SELECTORS: &[&str] = &["main > .container", "main", "body"];

/// Page chrome dropped from an extracted container.
const CHROME_TAGS: &[&str] = &["header", "nav", "footer", "script", "style"];

/// Run all cleanup passes over a raw reply.
pub fn clean_fragment(raw: &str) -> String {
    let mut result = strip_code_fence(raw);

    if is_full_document(&result) {
        debug!("reply is a full document, extracting content area");
        result = extract_content(&result);
    }

    result.trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: Code fences
// ---------------------------------------------------------------------------

/// Remove a markdown code fence around the reply.
///
/// A fence wrapping the entire reply is always stripped. Otherwise, when the
/// reply holds exactly one fenced block and the text around it is prose
/// (no markup), the block's content is kept and the prose dropped.
fn strip_code_fence(text: &str) -> String {
    static WRAPPED_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$").expect("valid regex")
    });
    static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```").expect("valid regex")
    });

    if let Some(caps) = WRAPPED_RE.captures(text) {
        return caps[1].to_string();
    }

    let blocks: Vec<_> = BLOCK_RE.captures_iter(text).collect();
    if let [caps] = blocks.as_slice() {
        let whole = &caps[0];
        let (before, after) = text.split_once(whole).unwrap_or((text, ""));
        if !before.contains('<') && !after.contains('<') {
            debug!("dropping prose around fenced block");
            return caps[1].to_string();
        }
    }

    text.to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Full-document extraction
// ---------------------------------------------------------------------------

fn is_full_document(html: &str) -> bool {
    static DOC_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)<(!doctype|html|body)[\s>]").expect("valid regex"));
    DOC_RE.is_match(html)
}

/// Pull the content area out of a complete HTML document.
fn extract_content(html: &str) -> String {
    let doc = Html::parse_document(html);

    for sel_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(sel_str) else {
            continue;
        };
        if let Some(el) = doc.select(&selector).next() {
            debug!(selector = sel_str, "content container found");
            return inner_html_without_chrome(&el);
        }
    }

    html.to_string()
}

/// Inner HTML of `el`, skipping direct children that are page chrome.
fn inner_html_without_chrome(el: &ElementRef) -> String {
    let mut out = String::new();

    for child in el.children() {
        match child.value() {
            Node::Element(element) => {
                if CHROME_TAGS.contains(&element.name()) {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    out.push_str(&child_el.html());
                }
            }
            Node::Text(text) => push_escaped_text(&mut out, text),
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            _ => {}
        }
    }

    out
}

/// Re-escape a decoded text node the way the HTML serializer does.
fn push_escaped_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
