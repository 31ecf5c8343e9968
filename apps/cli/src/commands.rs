//! CLI definition, routing, and tracing setup.

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, bail};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::info;
use tracing_subscriber::fmt::MakeWriter;

use articlepress_core::llm::OpenAiClient;
use articlepress_core::pipeline::{ProcessOptions, ProcessResult, ProgressReporter};
use articlepress_shared::{
    AppConfig, init_config, init_config_at, load_config, load_config_from, resolve_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ArticlePress — publish markdown articles as site pages.
#[derive(Parser)]
#[command(
    name = "articlepress",
    version,
    about = "Generate site pages from markdown articles using an LLM.",
    long_about = None
)]
pub(crate) struct Cli {
    /// Article markdown file, relative to the articles directory
    /// (defaults to `site.default_article`).
    pub article: Option<PathBuf>,

    /// Output HTML filename (derived from the title by default).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Update an existing HTML page.
    #[arg(short, long)]
    pub update: bool,

    /// API key (or set the env var named by `llm.api_key_env`).
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// List article files and exit.
    #[arg(short, long)]
    pub list: bool,

    /// Override the configured model.
    #[arg(long)]
    pub model: Option<String>,

    /// Override the directory pages are written to.
    #[arg(long)]
    pub site_root: Option<PathBuf>,

    /// Override the directory articles are read from.
    #[arg(long)]
    pub articles_dir: Option<PathBuf>,

    /// Config file to use instead of the default lookup.
    #[arg(long, env = "ARTICLEPRESS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Article-processing flags that were given on the command line.
    fn process_flags(&self) -> Vec<&'static str> {
        let given = [
            ("ARTICLE", self.article.is_some()),
            ("--output", self.output.is_some()),
            ("--update", self.update),
            ("--api-key", self.api_key.is_some()),
            ("--list", self.list),
            ("--model", self.model.is_some()),
            ("--site-root", self.site_root.is_some()),
            ("--articles-dir", self.articles_dir.is_some()),
        ];
        given
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a config file with defaults.
    Init {
        /// Directory to write `articlepress.toml` into (defaults to `~/.articlepress`).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Returns the (hidden) spinner that log lines are written around; the
/// progress reporter draws on that same bar.
pub(crate) fn init_tracing(cli: &Cli) -> ProgressBar {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "articlepress=info",
        1 => "articlepress=debug",
        _ => "articlepress=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let spinner = ProgressBar::hidden();
    let writer = SpinnerAwareStderr {
        spinner: spinner.clone(),
    };

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(writer)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .init();
        }
    }

    spinner
}

/// Writes log lines to stderr with the spinner suspended.
#[derive(Clone)]
struct SpinnerAwareStderr {
    spinner: ProgressBar,
}

impl<'a> MakeWriter<'a> for SpinnerAwareStderr {
    type Writer = LogLine;

    fn make_writer(&'a self) -> Self::Writer {
        LogLine {
            spinner: self.spinner.clone(),
            buf: Vec::new(),
        }
    }
}

/// One buffered log event, flushed to stderr on drop.
struct LogLine {
    spinner: ProgressBar,
    buf: Vec<u8>,
}

impl io::Write for LogLine {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogLine {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let buf = std::mem::take(&mut self.buf);
        self.spinner.suspend(|| {
            let _ = io::stderr().write_all(&buf);
        });
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli, spinner: ProgressBar) -> Result<()> {
    if let Some(Command::Config { action }) = &cli.command {
        check_no_process_flags(&cli)?;
        return match action {
            ConfigAction::Init { dir } => cmd_config_init(dir.as_deref()),
            ConfigAction::Show => cmd_config_show(&resolve_config(&cli)?),
        };
    }

    let config = resolve_config(&cli)?;

    if cli.list {
        return cmd_list(&config);
    }

    cmd_process(&cli, &config, spinner).await
}

/// Reject article-processing flags combined with a subcommand.
fn check_no_process_flags(cli: &Cli) -> Result<()> {
    let flags = cli.process_flags();
    if !flags.is_empty() {
        bail!("{} cannot be used with the config subcommand", flags.join(", "));
    }
    Ok(())
}

/// Load config and apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    apply_overrides(cli, &mut config);
    Ok(config)
}

fn apply_overrides(cli: &Cli, config: &mut AppConfig) {
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(root) = &cli.site_root {
        config.site.root_dir = root.clone();
    }
    if let Some(dir) = &cli.articles_dir {
        config.site.articles_dir = dir.clone();
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_process(cli: &Cli, config: &AppConfig, spinner: ProgressBar) -> Result<()> {
    let api_key = resolve_api_key(&config.llm, cli.api_key.as_deref())?;
    let client = OpenAiClient::new(&config.llm, api_key)?;

    let article = cli
        .article
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.site.default_article));
    let article_path = config.site.articles_dir.join(article);

    let opts = ProcessOptions {
        article_path,
        output_filename: cli.output.clone(),
        update: cli.update,
        output_root: config.site.root_dir.clone(),
    };

    info!(
        article = %opts.article_path.display(),
        model = client.model(),
        update = cli.update,
        "processing article"
    );

    let reporter = CliProgress::new(spinner);
    let result =
        articlepress_core::pipeline::process_article(&client, config, &opts, &reporter).await;
    reporter.finish();
    let result = result?;

    let verb = if cli.update { "updated" } else { "created" };
    println!();
    println!("  ✓ Successfully {verb} {}", result.output_path.display());
    println!("  Category:   {}", result.meta.category);
    println!("  Tags:       {}", result.meta.tags.join(", "));
    if !result.meta.references.is_empty() {
        println!("  References: {}", result.meta.references.join(", "));
    }
    println!("  Time:       {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_list(config: &AppConfig) -> Result<()> {
    let dir = &config.site.articles_dir;
    let articles = articlepress_core::pipeline::list_articles(dir)?;

    println!("Found {} article(s) in {}:", articles.len(), dir.display());
    for article in &articles {
        let name = article
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  - {name}");
    }

    Ok(())
}

fn cmd_config_init(dir: Option<&Path>) -> Result<()> {
    let path = match dir {
        Some(dir) => init_config_at(dir)?,
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    /// Show `spinner`, the bar the log writer suspends around.
    fn new(spinner: ProgressBar) -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.set_draw_target(ProgressDrawTarget::stderr());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &ProcessResult) {
        self.spinner.finish_and_clear();
    }
}
