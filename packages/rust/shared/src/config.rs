//! Application configuration for ArticlePress.
//!
//! Config is looked up at `./articlepress.toml`, then
//! `~/.articlepress/articlepress.toml`. CLI flags override config file
//! values, which override defaults. The defaults reproduce the site the
//! tool was written for, so running without a config file works.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ArticlePressError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "articlepress.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".articlepress";

// ---------------------------------------------------------------------------
// Config structs (matching articlepress.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Text-generation service settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Site chrome and directory layout.
    #[serde(default)]
    pub site: SiteConfig,
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for both taxonomy and HTML generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// HTTP request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// System message for the markdown → HTML request.
    #[serde(default = "default_system_prompt_html")]
    pub system_prompt_html: String,

    /// System message for the category/tag request.
    #[serde(default = "default_system_prompt_taxonomy")]
    pub system_prompt_taxonomy: String,

    /// Sampling settings for the markdown → HTML request.
    #[serde(default = "GenerationTuning::html")]
    pub html: GenerationTuning,

    /// Sampling settings for the category/tag request.
    #[serde(default = "GenerationTuning::taxonomy")]
    pub taxonomy: GenerationTuning,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            system_prompt_html: default_system_prompt_html(),
            system_prompt_taxonomy: default_system_prompt_taxonomy(),
            html: GenerationTuning::html(),
            taxonomy: GenerationTuning::taxonomy(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4".into()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_system_prompt_html() -> String {
    "You are an expert web developer specializing in educational content sites. \
     You create clean, semantic HTML with proper Japanese language support."
        .into()
}
fn default_system_prompt_taxonomy() -> String {
    "You are an expert in educational content organization for Japanese middle school \
     entrance exams."
        .into()
}

/// `[llm.html]` / `[llm.taxonomy]` tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationTuning {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl GenerationTuning {
    /// Defaults for fragment generation.
    pub fn html() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4000,
        }
    }

    /// Defaults for taxonomy inference.
    pub fn taxonomy() -> Self {
        Self {
            temperature: 0.5,
            max_tokens: 500,
        }
    }
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site name shown in the logo and `<title>` suffix.
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Value of `<html lang>`.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Stylesheet href.
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,

    /// How the site is described to the text-generation service.
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Breadcrumb root link.
    #[serde(default = "default_home_href")]
    pub home_href: String,

    /// Breadcrumb root label.
    #[serde(default = "default_home_label")]
    pub home_label: String,

    /// Footer paragraph (inserted as HTML).
    #[serde(default = "default_footer_text")]
    pub footer_text: String,

    /// Directory pages are written to.
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Directory article markdown files are read from.
    #[serde(default = "default_articles_dir")]
    pub articles_dir: PathBuf,

    /// Article processed when none is named on the command line.
    #[serde(default = "default_article")]
    pub default_article: String,

    /// Header navigation, in display order.
    #[serde(default = "default_nav")]
    pub nav: Vec<NavLink>,

    /// Known categories and the page each one belongs to.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryEntry>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            lang: default_lang(),
            stylesheet: default_stylesheet(),
            audience: default_audience(),
            home_href: default_home_href(),
            home_label: default_home_label(),
            footer_text: default_footer_text(),
            root_dir: default_root_dir(),
            articles_dir: default_articles_dir(),
            default_article: default_article(),
            nav: default_nav(),
            categories: default_categories(),
        }
    }
}

impl SiteConfig {
    /// Page associated with a category, if the category is known.
    pub fn category_page(&self, category: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.page.as_str())
    }
}

/// `[[site.nav]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub href: String,
    pub label: String,
}

/// `[[site.categories]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// Category name as written in frontmatter.
    pub name: String,
    /// Short English gloss shown to the text-generation service.
    #[serde(default)]
    pub gloss: String,
    /// Page that lists this category's articles.
    pub page: String,
}

fn default_site_name() -> String {
    "中学受験パス".into()
}
fn default_lang() -> String {
    "ja".into()
}
fn default_stylesheet() -> String {
    "styles.css".into()
}
fn default_audience() -> String {
    "a Japanese middle school entrance exam preparation website".into()
}
fn default_home_href() -> String {
    "index.html".into()
}
fn default_home_label() -> String {
    "ホーム".into()
}
fn default_footer_text() -> String {
    "&copy; 2024 中学受験パス. 頑張る受験生を応援します。".into()
}
fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_articles_dir() -> PathBuf {
    PathBuf::from("scripts")
}
fn default_article() -> String {
    "article.md".into()
}

fn default_categories() -> Vec<CategoryEntry> {
    [
        ("算数", "Math", "math.html"),
        ("国語", "Japanese", "japanese.html"),
        ("理科", "Science", "science.html"),
        ("社会", "Social Studies", "social.html"),
        ("コツ・勉強法", "Study Tips", "tips.html"),
    ]
    .into_iter()
    .map(|(name, gloss, page)| CategoryEntry {
        name: name.into(),
        gloss: gloss.into(),
        page: page.into(),
    })
    .collect()
}

fn default_nav() -> Vec<NavLink> {
    let mut nav = vec![NavLink {
        href: default_home_href(),
        label: default_home_label(),
    }];
    nav.extend(default_categories().into_iter().map(|c| NavLink {
        href: c.page,
        label: c.name,
    }));
    nav
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.articlepress/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ArticlePressError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Load the application config.
///
/// Checks `./articlepress.toml` first, then the user config file.
/// Returns defaults if neither exists.
pub fn load_config() -> Result<AppConfig> {
    load_config_in(Path::new("."), &config_dir()?)
}

/// Load the config from `local_dir` or, failing that, `user_dir`.
///
/// The file in `local_dir` takes precedence. Returns defaults if neither
/// directory holds an `articlepress.toml`.
pub fn load_config_in(local_dir: &Path, user_dir: &Path) -> Result<AppConfig> {
    let local = local_dir.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return load_config_from(&local);
    }

    let path = user_dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ArticlePressError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ArticlePressError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate(&config)?;
    tracing::debug!(?path, "loaded config");
    Ok(config)
}

/// Create the user config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_at(&config_dir()?)
}

/// Write a default config file into `dir`, creating it if needed.
pub fn init_config_at(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| ArticlePressError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ArticlePressError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ArticlePressError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

fn validate(config: &AppConfig) -> Result<()> {
    Url::parse(&config.llm.base_url).map_err(|e| {
        ArticlePressError::config(format!("invalid llm.base_url '{}': {e}", config.llm.base_url))
    })?;

    if config.llm.model.trim().is_empty() {
        return Err(ArticlePressError::config("llm.model must not be empty"));
    }

    Ok(())
}

/// Resolve the API key: an explicit value wins, then the configured env var.
///
/// Empty values count as missing.
pub fn resolve_api_key(config: &LlmConfig, explicit: Option<&str>) -> Result<String> {
    if let Some(key) = explicit.filter(|k| !k.trim().is_empty()) {
        return Ok(key.trim().to_string());
    }

    let var_name = &config.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val.trim().to_string()),
        _ => Err(ArticlePressError::config(format!(
            "API key not found. Set the {var_name} environment variable or pass --api-key."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ap-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("OPENAI_API_KEY"));
        assert!(toml_str.contains("math.html"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.llm.model, "gpt-4");
        assert_eq!(parsed.llm.html.max_tokens, 4000);
        assert_eq!(parsed.llm.taxonomy.max_tokens, 500);
        assert_eq!(parsed.site.nav.len(), 6);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[llm]
model = "gpt-4o-mini"

[site]
root_dir = "/srv/site"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.site.root_dir, PathBuf::from("/srv/site"));
        assert_eq!(config.site.articles_dir, PathBuf::from("scripts"));
        assert_eq!(config.site.name, "中学受験パス");
    }

    #[test]
    fn custom_categories_replace_defaults() {
        let toml_str = r#"
[[site.categories]]
name = "Rust"
page = "rust.html"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.site.categories.len(), 1);
        assert_eq!(config.site.category_page("Rust"), Some("rust.html"));
        assert_eq!(config.site.category_page("算数"), None);
    }

    #[test]
    fn default_category_pages() {
        let site = SiteConfig::default();
        assert_eq!(site.category_page("算数"), Some("math.html"));
        assert_eq!(site.category_page("コツ・勉強法"), Some("tips.html"));
        assert_eq!(site.category_page("General"), None);
        assert_eq!(site.nav[0].href, "index.html");
        assert_eq!(site.nav[0].label, "ホーム");
    }

    #[test]
    fn load_rejects_invalid_base_url() {
        let dir = temp_dir();
        let path = dir.join("articlepress.toml");
        std::fs::write(&path, "[llm]\nbase_url = \"not a url\"\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("llm.base_url"));
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = temp_dir();
        let path = dir.join("articlepress.toml");
        std::fs::write(&path, "[llm\nmodel = ").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn init_config_writes_loadable_file() {
        let dir = temp_dir().join("nested");
        let path = init_config_at(&dir).expect("init");
        assert!(path.exists());

        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.site.default_article, "article.md");
    }

    #[test]
    fn local_config_wins_over_user_config() {
        let local = temp_dir();
        let user = temp_dir();
        std::fs::write(local.join(CONFIG_FILE_NAME), "[llm]\nmodel = \"local-model\"\n").unwrap();
        std::fs::write(user.join(CONFIG_FILE_NAME), "[llm]\nmodel = \"user-model\"\n").unwrap();

        let config = load_config_in(&local, &user).expect("load");
        assert_eq!(config.llm.model, "local-model");
    }

    #[test]
    fn user_config_used_without_local_file() {
        let local = temp_dir();
        let user = temp_dir();
        std::fs::write(user.join(CONFIG_FILE_NAME), "[llm]\nmodel = \"user-model\"\n").unwrap();

        let config = load_config_in(&local, &user).expect("load");
        assert_eq!(config.llm.model, "user-model");
    }

    #[test]
    fn defaults_without_any_config_file() {
        let config = load_config_in(&temp_dir(), &temp_dir().join("missing")).expect("load");
        assert_eq!(config.llm.model, "gpt-4");
        assert_eq!(config.site.default_article, "article.md");
    }

    #[test]
    fn explicit_api_key_wins() {
        let mut config = LlmConfig::default();
        config.api_key_env = "AP_TEST_NONEXISTENT_KEY_12345".into();
        let key = resolve_api_key(&config, Some(" sk-test ")).expect("explicit key");
        assert_eq!(key, "sk-test");
    }

    #[test]
    fn missing_api_key_names_env_var() {
        let mut config = LlmConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.api_key_env = "AP_TEST_NONEXISTENT_KEY_67890".into();
        let err = resolve_api_key(&config, Some("  ")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("API key not found"));
        assert!(msg.contains("AP_TEST_NONEXISTENT_KEY_67890"));
    }
}
