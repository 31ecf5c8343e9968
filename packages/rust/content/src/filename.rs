//! Output filename derivation.

use std::path::Path;
use std::sync::LazyLock;

use articlepress_shared::ArticleMeta;
use regex::Regex;

/// Turn a title into a filename stem.
///
/// Drops everything except word characters, whitespace and `-` (Unicode
/// aware, so Japanese titles keep their characters), collapses runs of
/// `-`/whitespace into one `-`, and lowercases.
pub fn slugify_title(title: &str) -> String {
    static STRIP_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
    static DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

    let stripped = STRIP_RE.replace_all(title, "");
    DASH_RE.replace_all(&stripped, "-").to_lowercase()
}

/// Compute the page filename for an article.
///
/// Uses the slugified title, falling back to the article's file stem when
/// the title is empty or slugifies to nothing.
pub fn output_filename(meta: &ArticleMeta, article_path: &Path) -> String {
    let slug = slugify_title(meta.title.trim());
    if !slug.is_empty() && slug != "-" {
        return format!("{slug}.html");
    }

    let stem = article_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "article".to_string());
    format!("{stem}.html")
}
