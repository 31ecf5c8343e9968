//! Prompt text sent to the text-generation service.

use articlepress_shared::{ArticleMeta, SiteConfig};

/// Characters of article text shown to the service for taxonomy inference.
pub const TAXONOMY_EXCERPT_CHARS: usize = 1000;

/// Prompt asking for a category, tags and related pages as JSON.
pub fn taxonomy_prompt(site: &SiteConfig, content: &str) -> String {
    let categories = site
        .categories
        .iter()
        .map(|c| {
            if c.gloss.is_empty() {
                format!("- {}", c.name)
            } else {
                format!("- {} ({})", c.name, c.gloss)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let excerpt = truncate_chars(content, TAXONOMY_EXCERPT_CHARS);

    format!(
        r#"Analyze the following article content and suggest appropriate categories and tags for {audience}.

Existing categories on the site:
{categories}

Article content:
{excerpt}...

Provide your response as JSON with the following structure:
{{
    "category": "suggested category (use one of the existing categories or suggest a new one in Japanese)",
    "tags": ["tag1", "tag2", "tag3"],
    "related_pages": ["page1.html", "page2.html"]
}}

Suggest 3-5 relevant tags in Japanese."#,
        audience = site.audience,
    )
}

/// Prompt asking for the article body as an HTML content fragment.
pub fn html_prompt(site: &SiteConfig, meta: &ArticleMeta, body: &str) -> String {
    format!(
        r#"Convert the following markdown article into well-structured HTML content for {audience}.

The article metadata:
- Title: {title}
- Category: {category}
- Tags: {tags}

Requirements:
1. Generate clean HTML content (without <!DOCTYPE>, <html>, <head>, or <body> tags)
2. Use semantic HTML5 tags (article, section, h2, h3, etc.)
3. Apply existing CSS classes from the site: article-content, highlight-box, warning-box
4. Create proper Japanese typography and formatting
5. Do not include the site header, navigation, breadcrumbs, or footer; they are added separately
6. Add internal links to related pages if references are provided: {references}
7. Use tables with inline styles matching the existing site style (border-collapse:collapse, padding:0.5rem, border:1px solid #ddd)
8. Wrap the whole result in <article class="article-content">

Markdown content:
{body}

Return only the HTML fragment for the page's content area, with no explanation and no code fences."#,
        audience = site.audience,
        title = meta.title_or_default(),
        category = meta.category_or_default(),
        tags = meta.tags.join(", "),
        references = meta.references.join(", "),
    )
}

/// First `max_chars` characters of `content` (never splits a character).
pub(crate) fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}
