//! ArticlePress CLI — turn a markdown article into a finished site page.
//!
//! Reads frontmatter, asks a text-generation service for missing taxonomy
//! and the HTML content fragment, and writes the page with the site chrome.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let spinner = commands::init_tracing(&cli);
    commands::run(cli, spinner).await
}
