//! Error types for ArticlePress.
//!
//! Library crates use [`ArticlePressError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ArticlePress operations.
#[derive(Debug, thiserror::Error)]
pub enum ArticlePressError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The requested article file does not exist.
    #[error("article not found: {}", path.display())]
    ArticleNotFound { path: PathBuf },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Transport-level failure talking to the text-generation service.
    #[error("network error: {0}")]
    Network(String),

    /// The text-generation service rejected the request or returned an unusable reply.
    #[error("llm error: {0}")]
    Llm(String),

    /// Generated or supplied data failed a sanity check.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ArticlePressError>;

impl ArticlePressError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ArticlePressError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = ArticlePressError::ArticleNotFound {
            path: PathBuf::from("scripts/article.md"),
        };
        assert_eq!(err.to_string(), "article not found: scripts/article.md");

        let err = ArticlePressError::Llm("OpenAI API error 429".into());
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ArticlePressError::io("/srv/site/page.html", source);
        let msg = err.to_string();
        assert!(msg.contains("page.html"));
        assert!(msg.contains("denied"));
    }
}
