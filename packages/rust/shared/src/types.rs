//! Core domain types for ArticlePress articles.

use serde::{Deserialize, Serialize};

/// Title used in prompts and page chrome when the article has none.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Category used when neither the article nor the service supplies one.
pub const DEFAULT_CATEGORY: &str = "General";

// ---------------------------------------------------------------------------
// ArticleMeta
// ---------------------------------------------------------------------------

/// Metadata extracted from an article's frontmatter.
///
/// Every field is optional in the source file; missing values are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMeta {
    /// Page title.
    pub title: String,
    /// Value for the `<meta name="description">` tag.
    pub description: String,
    /// Site category (e.g. `算数`).
    pub category: String,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Related pages to link from the article body.
    pub references: Vec<String>,
}

impl ArticleMeta {
    /// Whether the category or tags must be inferred before rendering.
    pub fn needs_taxonomy(&self) -> bool {
        self.category.is_empty() || self.tags.is_empty()
    }

    /// The title, or [`DEFAULT_TITLE`] when empty.
    pub fn title_or_default(&self) -> &str {
        if self.title.is_empty() {
            DEFAULT_TITLE
        } else {
            &self.title
        }
    }

    /// The category, or [`DEFAULT_CATEGORY`] when empty.
    pub fn category_or_default(&self) -> &str {
        if self.category.is_empty() {
            DEFAULT_CATEGORY
        } else {
            &self.category
        }
    }
}

// ---------------------------------------------------------------------------
// TaxonomySuggestion
// ---------------------------------------------------------------------------

/// Category/tag suggestion returned by the text-generation service as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomySuggestion {
    /// Suggested category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Suggested tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Suggested related page filenames.
    #[serde(default)]
    pub related_pages: Vec<String>,
}

impl TaxonomySuggestion {
    /// Suggestion used when the service is unavailable or replies with garbage.
    pub fn fallback() -> Self {
        Self {
            category: Some(DEFAULT_CATEGORY.to_string()),
            tags: Vec::new(),
            related_pages: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_meta_needs_taxonomy() {
        let meta = ArticleMeta::default();
        assert!(meta.needs_taxonomy());
        assert_eq!(meta.title_or_default(), "Untitled");
        assert_eq!(meta.category_or_default(), "General");
    }

    #[test]
    fn meta_with_category_but_no_tags_needs_taxonomy() {
        let meta = ArticleMeta {
            category: "算数".into(),
            ..Default::default()
        };
        assert!(meta.needs_taxonomy());

        let meta = ArticleMeta {
            category: "算数".into(),
            tags: vec!["図形".into()],
            ..Default::default()
        };
        assert!(!meta.needs_taxonomy());
    }

    #[test]
    fn suggestion_tolerates_missing_fields() {
        let parsed: TaxonomySuggestion = serde_json::from_str(r#"{"tags":["速さ"]}"#).unwrap();
        assert_eq!(parsed.category, None);
        assert_eq!(parsed.tags, vec!["速さ".to_string()]);
        assert!(parsed.related_pages.is_empty());
    }

    #[test]
    fn suggestion_parses_full_reply() {
        let json = r#"{
            "category": "理科",
            "tags": ["天体", "月の満ち欠け", "観察"],
            "related_pages": ["science.html"]
        }"#;
        let parsed: TaxonomySuggestion = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.category.as_deref(), Some("理科"));
        assert_eq!(parsed.tags.len(), 3);
        assert_eq!(parsed.related_pages, vec!["science.html".to_string()]);
    }

    #[test]
    fn fallback_uses_general_category() {
        let fallback = TaxonomySuggestion::fallback();
        assert_eq!(fallback.category.as_deref(), Some("General"));
        assert!(fallback.tags.is_empty());
    }
}
