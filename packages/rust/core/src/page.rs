//! Static page template: header, nav, breadcrumb, content area, footer.

use std::fmt::Write as _;

use articlepress_shared::{ArticleMeta, SiteConfig};

/// Wrap an HTML fragment in the site's page chrome.
///
/// The nav link for the article's category page is marked active; when the
/// category has no page, the link matching `output_filename` is (if any).
/// Title and description are escaped, the fragment is inserted as-is.
pub fn render_page(
    site: &SiteConfig,
    meta: &ArticleMeta,
    fragment: &str,
    output_filename: &str,
) -> String {
    let title = escape_html(meta.title_or_default());
    let description = escape_html(&meta.description);
    let site_name = escape_html(&site.name);

    let active_page = site
        .category_page(meta.category_or_default())
        .unwrap_or(output_filename);

    let nav_html = render_nav(site, active_page);
    let breadcrumb_html = render_breadcrumb(site, &title);

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - {site_name}</title>
    <meta name="description" content="{description}">
    <link rel="stylesheet" href="{stylesheet}">
</head>
<body>
    <header class="header">
        <div class="container">
            <h1 class="logo">{site_name}</h1>
            <nav class="nav">
                <ul class="nav-list">
{nav_html}
                </ul>
            </nav>
        </div>
    </header>

{breadcrumb_html}

    <main class="main">
        <div class="container">
{fragment}
        </div>
    </main>

    <footer class="footer">
        <div class="container">
            <p class="footer-text">{footer}</p>
        </div>
    </footer>
</body>
</html>"#,
        lang = escape_html(&site.lang),
        stylesheet = escape_html(&site.stylesheet),
        footer = site.footer_text,
    )
}

fn render_nav(site: &SiteConfig, active_page: &str) -> String {
    let mut out = String::new();
    for (i, link) in site.nav.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let active = if link.href == active_page { " active" } else { "" };
        let _ = write!(
            out,
            r#"                    <li><a href="{}" class="nav-link{active}">{}</a></li>"#,
            escape_html(&link.href),
            escape_html(&link.label),
        );
    }
    out
}

fn render_breadcrumb(site: &SiteConfig, escaped_title: &str) -> String {
    format!(
        r#"    <nav class="breadcrumb">
        <div class="container">
            <ol class="breadcrumb-list">
                <li><a href="{href}" class="breadcrumb-link">{label}</a></li>
                <li class="breadcrumb-separator">&gt;</li>
                <li>{escaped_title}</li>
            </ol>
        </div>
    </nav>"#,
        href = escape_html(&site.home_href),
        label = escape_html(&site.home_label),
    )
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
