//! Core pipeline and domain logic for ArticlePress.
//!
//! This crate ties together frontmatter parsing, LLM enrichment and the
//! page template into the end-to-end `process_article` workflow.

pub mod enrichment;
pub mod llm;
pub mod page;
pub mod pipeline;
pub mod prompts;

#[cfg(test)]
mod testing;
