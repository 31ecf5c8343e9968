//! Shared types, error model, and configuration for ArticlePress.
//!
//! This crate is the foundation depended on by all other ArticlePress crates.
//! It provides:
//! - [`ArticlePressError`] — the unified error type
//! - Domain types ([`ArticleMeta`], [`TaxonomySuggestion`])
//! - Configuration ([`AppConfig`], [`LlmConfig`], [`SiteConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CategoryEntry, GenerationTuning, LlmConfig, NavLink, SiteConfig, config_dir,
    init_config, init_config_at, load_config, load_config_from, load_config_in, resolve_api_key,
};
pub use error::{ArticlePressError, Result};
pub use types::{ArticleMeta, DEFAULT_CATEGORY, DEFAULT_TITLE, TaxonomySuggestion};
