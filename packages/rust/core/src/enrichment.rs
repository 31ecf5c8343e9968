//! LLM enrichment: taxonomy inference and markdown → HTML fragment rendering.

use tracing::{info, instrument, warn};

use articlepress_content::clean_fragment;
use articlepress_shared::{
    ArticleMeta, ArticlePressError, DEFAULT_CATEGORY, LlmConfig, Result, SiteConfig,
    TaxonomySuggestion,
};

use crate::llm::{ChatRequest, TextGenerator};
use crate::prompts;

/// Ask the service for a category, tags and related pages.
///
/// Never fails: a service error or an unparsable reply is logged and
/// replaced by [`TaxonomySuggestion::fallback`].
#[instrument(skip_all, fields(content_len = content.len()))]
pub async fn suggest_taxonomy<G: TextGenerator>(
    generator: &G,
    llm: &LlmConfig,
    site: &SiteConfig,
    content: &str,
) -> TaxonomySuggestion {
    let request = ChatRequest::new(
        &llm.system_prompt_taxonomy,
        prompts::taxonomy_prompt(site, content),
        llm.taxonomy,
    )
    .json();

    let reply = match generator.complete(&request).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "could not generate categories/tags");
            return TaxonomySuggestion::fallback();
        }
    };

    match parse_suggestion(&reply) {
        Ok(suggestion) => {
            info!(
                category = suggestion.category.as_deref().unwrap_or(""),
                tags = suggestion.tags.len(),
                related = suggestion.related_pages.len(),
                "taxonomy suggested"
            );
            suggestion
        }
        Err(e) => {
            warn!(error = %e, "could not parse categories/tags reply");
            TaxonomySuggestion::fallback()
        }
    }
}

/// Fill the metadata fields that are still empty from a suggestion.
///
/// Returns the fields that were filled, for reporting.
pub fn apply_suggestion(meta: &mut ArticleMeta, suggestion: &TaxonomySuggestion) -> Vec<&'static str> {
    let mut filled = Vec::new();

    if meta.category.is_empty() {
        meta.category = suggestion
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();
        filled.push("category");
    }

    if meta.tags.is_empty() && !suggestion.tags.is_empty() {
        meta.tags = clean_list(&suggestion.tags);
        filled.push("tags");
    }

    if meta.references.is_empty() && !suggestion.related_pages.is_empty() {
        meta.references = clean_list(&suggestion.related_pages);
        filled.push("references");
    }

    filled
}

/// Convert the markdown body into the page's HTML content fragment.
///
/// Service errors propagate; an empty reply is a validation error.
#[instrument(skip_all, fields(title = %meta.title_or_default(), body_len = body.len()))]
pub async fn render_fragment<G: TextGenerator>(
    generator: &G,
    llm: &LlmConfig,
    site: &SiteConfig,
    meta: &ArticleMeta,
    body: &str,
) -> Result<String> {
    let request = ChatRequest::new(
        &llm.system_prompt_html,
        prompts::html_prompt(site, meta, body),
        llm.html,
    );

    let reply = generator.complete(&request).await?;
    let fragment = clean_fragment(&reply);

    if fragment.is_empty() {
        return Err(ArticlePressError::validation(
            "text-generation service returned an empty HTML fragment",
        ));
    }

    info!(fragment_len = fragment.len(), "HTML fragment generated");
    Ok(fragment)
}

/// Parse the JSON reply, tolerating a surrounding code fence.
fn parse_suggestion(reply: &str) -> Result<TaxonomySuggestion> {
    let trimmed = reply.trim();
    let json = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };

    serde_json::from_str(json).map_err(|e| {
        let excerpt: String = trimmed.chars().take(200).collect();
        ArticlePressError::Llm(format!("invalid taxonomy JSON: {e} (got: {excerpt})"))
    })
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;

    #[test]
    fn parse_plain_json() {
        let s = parse_suggestion(r#"{"category":"国語","tags":["漢字"],"related_pages":[]}"#).unwrap();
        assert_eq!(s.category.as_deref(), Some("国語"));
        assert_eq!(s.tags, vec!["漢字".to_string()]);
    }

    #[test]
    fn parse_fenced_json() {
        let s = parse_suggestion("```json\n{\"category\":\"社会\"}\n```").unwrap();
        assert_eq!(s.category.as_deref(), Some("社会"));
    }

    #[test]
    fn parse_garbage_fails() {
        assert!(parse_suggestion("I think it is math").is_err());
    }

    #[test]
    fn apply_fills_only_missing_fields() {
        let mut meta = ArticleMeta {
            category: "理科".into(),
            references: vec!["science.html".into()],
            ..Default::default()
        };
        let suggestion = TaxonomySuggestion {
            category: Some("算数".into()),
            tags: vec![" 天体 ".into(), "".into(), "星座".into()],
            related_pages: vec!["math.html".into()],
        };

        let filled = apply_suggestion(&mut meta, &suggestion);
        assert_eq!(filled, vec!["tags"]);
        assert_eq!(meta.category, "理科");
        assert_eq!(meta.tags, vec!["天体", "星座"]);
        assert_eq!(meta.references, vec!["science.html"]);
    }

    #[test]
    fn apply_defaults_category_to_general() {
        let mut meta = ArticleMeta::default();
        let suggestion = TaxonomySuggestion {
            category: Some("  ".into()),
            ..Default::default()
        };
        apply_suggestion(&mut meta, &suggestion);
        assert_eq!(meta.category, "General");
        assert!(meta.tags.is_empty());
    }

    #[test]
    fn apply_fills_references_from_related_pages() {
        let mut meta = ArticleMeta::default();
        let suggestion = TaxonomySuggestion {
            category: Some("社会".into()),
            tags: vec!["地理".into()],
            related_pages: vec!["social.html".into()],
        };
        let filled = apply_suggestion(&mut meta, &suggestion);
        assert_eq!(filled, vec!["category", "tags", "references"]);
        assert_eq!(meta.references, vec!["social.html"]);
    }

    #[tokio::test]
    async fn suggest_sends_json_request() {
        let generator =
            ScriptedGenerator::new(vec![Ok(r#"{"category":"算数","tags":["速さ"]}"#.into())]);
        let llm = LlmConfig::default();

        let suggestion =
            suggest_taxonomy(&generator, &llm, &SiteConfig::default(), "旅人算の問題").await;
        assert_eq!(suggestion.category.as_deref(), Some("算数"));

        let requests = generator.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].json_response);
        assert_eq!(requests[0].max_tokens, 500);
        assert_eq!(requests[0].system, llm.system_prompt_taxonomy);
    }

    #[tokio::test]
    async fn suggest_falls_back_on_service_error() {
        let generator = ScriptedGenerator::new(vec![Err(ArticlePressError::Llm("boom".into()))]);
        let suggestion = suggest_taxonomy(
            &generator,
            &LlmConfig::default(),
            &SiteConfig::default(),
            "text",
        )
        .await;
        assert_eq!(suggestion, TaxonomySuggestion::fallback());
    }

    #[tokio::test]
    async fn suggest_falls_back_on_bad_json() {
        let generator = ScriptedGenerator::new(vec![Ok("not json".into())]);
        let suggestion = suggest_taxonomy(
            &generator,
            &LlmConfig::default(),
            &SiteConfig::default(),
            "text",
        )
        .await;
        assert_eq!(suggestion, TaxonomySuggestion::fallback());
    }

    #[tokio::test]
    async fn render_cleans_reply() {
        let generator = ScriptedGenerator::new(vec![Ok(
            "```html\n<article class=\"article-content\"><p>本文</p></article>\n```".into(),
        )]);
        let llm = LlmConfig::default();
        let fragment = render_fragment(
            &generator,
            &llm,
            &SiteConfig::default(),
            &ArticleMeta::default(),
            "本文",
        )
        .await
        .unwrap();
        assert_eq!(fragment, "<article class=\"article-content\"><p>本文</p></article>");

        let requests = generator.requests();
        assert!(!requests[0].json_response);
        assert_eq!(requests[0].max_tokens, 4000);
        assert!((requests[0].temperature - 0.7).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn render_propagates_service_error() {
        let generator = ScriptedGenerator::new(vec![Err(ArticlePressError::Network("down".into()))]);
        let err = render_fragment(
            &generator,
            &LlmConfig::default(),
            &SiteConfig::default(),
            &ArticleMeta::default(),
            "body",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ArticlePressError::Network(_)));
    }

    #[tokio::test]
    async fn render_rejects_empty_reply() {
        let generator = ScriptedGenerator::new(vec![Ok("```html\n```".into())]);
        let err = render_fragment(
            &generator,
            &LlmConfig::default(),
            &SiteConfig::default(),
            &ArticleMeta::default(),
            "body",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ArticlePressError::Validation { .. }));
    }
}
