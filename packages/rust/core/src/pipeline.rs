//! End-to-end article pipeline: markdown file → metadata → LLM → page file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use articlepress_content::{output_filename, parse_frontmatter};
use articlepress_shared::{AppConfig, ArticleMeta, ArticlePressError, Result, TaxonomySuggestion};

use crate::enrichment;
use crate::llm::TextGenerator;
use crate::page;

/// Options for a single `process_article` run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Markdown article to read.
    pub article_path: PathBuf,
    /// Explicit page filename; derived from the title when `None`.
    pub output_filename: Option<String>,
    /// The caller intends to update an existing page.
    pub update: bool,
    /// Directory the page is written to.
    pub output_root: PathBuf,
}

/// Result of a `process_article` run.
#[derive(Debug)]
pub struct ProcessResult {
    /// Where the page was written.
    pub output_path: PathBuf,
    /// Metadata after taxonomy inference.
    pub meta: ArticleMeta,
    /// The service's suggestion, if one was requested.
    pub suggestion: Option<TaxonomySuggestion>,
    /// Whether a page already existed at `output_path`.
    pub existed: bool,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &ProcessResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &ProcessResult) {}
}

/// Run the full article pipeline.
///
/// 1. Read the article
/// 2. Parse frontmatter
/// 3. Infer category/tags if either is missing
/// 4. Render the body to an HTML fragment
/// 5. Wrap it in the page template and pick the filename
/// 6. Write the page
#[instrument(skip_all, fields(article = %opts.article_path.display(), update = opts.update))]
pub async fn process_article<G: TextGenerator>(
    generator: &G,
    config: &AppConfig,
    opts: &ProcessOptions,
    progress: &dyn ProgressReporter,
) -> Result<ProcessResult> {
    let start = Instant::now();

    // --- Phase 1: Read ---
    progress.phase("Reading article");
    let text = read_article(&opts.article_path)?;

    // --- Phase 2: Frontmatter ---
    let parsed = parse_frontmatter(&text);
    let mut meta = parsed.meta;
    debug!(?meta, has_frontmatter = parsed.has_frontmatter, "metadata extracted");

    // --- Phase 3: Taxonomy ---
    let suggestion = if meta.needs_taxonomy() {
        progress.phase("Generating categories and tags");
        let suggestion =
            enrichment::suggest_taxonomy(generator, &config.llm, &config.site, &text).await;
        let filled = enrichment::apply_suggestion(&mut meta, &suggestion);
        info!(?filled, category = %meta.category, tags = ?meta.tags, "metadata completed");
        Some(suggestion)
    } else {
        None
    };

    // --- Phase 4: Fragment ---
    progress.phase("Generating HTML content");
    let fragment =
        enrichment::render_fragment(generator, &config.llm, &config.site, &meta, &parsed.body)
            .await?;

    // --- Phase 5: Page ---
    progress.phase("Creating page");
    let filename = match &opts.output_filename {
        Some(name) => name.clone(),
        None => output_filename(&meta, &opts.article_path),
    };
    let output_path = opts.output_root.join(&filename);
    let existed = output_path.exists();

    if opts.update && !existed {
        warn!(
            path = %output_path.display(),
            "update requested but page does not exist, creating it"
        );
    }

    let html = page::render_page(&config.site, &meta, &fragment, &filename);

    // --- Phase 6: Write ---
    progress.phase("Writing page");
    write_page(&output_path, &html)?;

    let result = ProcessResult {
        output_path,
        meta,
        suggestion,
        existed,
        elapsed: start.elapsed(),
    };

    info!(
        path = %result.output_path.display(),
        existed,
        bytes = html.len(),
        "page written"
    );
    progress.done(&result);

    Ok(result)
}

/// List the markdown articles in `dir`, sorted by file name.
///
/// A missing directory yields an empty list.
pub fn list_articles(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "articles directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(ArticlePressError::io(dir, e)),
    };

    let mut articles = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ArticlePressError::io(dir, e))?.path();
        let is_md = path.extension().is_some_and(|ext| ext == "md");
        if is_md && path.is_file() {
            articles.push(path);
        }
    }
    articles.sort();

    Ok(articles)
}

fn read_article(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(ArticlePressError::ArticleNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| ArticlePressError::io(path, e))
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ArticlePressError::io(parent, e))?;
    }
    std::fs::write(path, html).map_err(|e| ArticlePressError::io(path, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
