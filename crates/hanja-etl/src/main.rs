//! `hanja-etl` — builds and checks the hanja knowledge base.
//!
//! Reads `hanja.toml` (or the path given with `--config`) layered under
//! `HANJA_*` environment variables.
//!
//! ```
//! hanja-etl run                # parse, gate, load, verify
//! hanja-etl run --dry-run      # parse and gate only
//! hanja-etl validate --post    # post-load battery against the store
//! hanja-etl template 清 語 明   # curation template for listed characters
//! hanja-etl curate data/meaning_tree_input.json
//! ```

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use hanja_etl::{PipelineConfig, curate, curate::TemplateDocument, pipeline};
use hanja_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Hanja knowledge-base ETL")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "hanja.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Parse sources, gate them, load the store and verify it.
  Run {
    /// Stop after the pre-load gate; nothing is written.
    #[arg(long)]
    dry_run: bool,
  },
  /// Run one validation battery on its own (pre-load by default).
  Validate {
    #[arg(long, conflicts_with = "post")]
    pre:  bool,
    #[arg(long)]
    post: bool,
  },
  /// Write a curation template.
  Template {
    /// Characters to template; omitted, candidates are ranked from the
    /// sources.
    chars:  Vec<char>,
    /// Output path; defaults to the configured template path.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Load the finished meaning trees of a curation document.
  Curate {
    file: PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let config = PipelineConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

  match cli.command {
    Command::Run { dry_run: true } => {
      let outcome = pipeline::dry_run(&config)?;
      print!("{outcome}");
      Ok(exit_code(outcome.succeeded()))
    }
    Command::Run { dry_run: false } => {
      let store = open_store(&config).await?;
      let outcome = pipeline::run(&config, &store).await?;
      print!("{outcome}");
      Ok(exit_code(outcome.succeeded()))
    }
    Command::Validate { post: true, .. } => {
      let store = open_store(&config).await?;
      let report = pipeline::verify(&config, &store).await?;
      println!("Post-load validation:");
      print!("{report}");
      Ok(exit_code(report.all_passed()))
    }
    Command::Validate { .. } => {
      let report = pipeline::precheck(&config)?;
      println!("Pre-load validation:");
      print!("{report}");
      Ok(exit_code(report.all_passed()))
    }
    Command::Template { chars, output } => {
      let document = pipeline::template(&config, &chars)?;
      let path = output.unwrap_or_else(|| config.template_path());
      document
        .write(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
      println!("Template written: {} ({} characters)", path.display(), document.count);
      Ok(ExitCode::SUCCESS)
    }
    Command::Curate { file } => {
      let store = open_store(&config).await?;
      let document = TemplateDocument::read(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;
      let summary = curate::ingest(&store, &document, config.page_size).await?;
      println!(
        "Meaning trees written: {} (pending {}, empty {}, unknown {})",
        summary.written,
        summary.pending,
        summary.empty,
        summary.unknown.len()
      );
      Ok(ExitCode::SUCCESS)
    }
  }
}

/// Open the configured store; a missing `store_path` is fatal here, before
/// any source is parsed.
async fn open_store(config: &PipelineConfig) -> anyhow::Result<SqliteStore> {
  let path = expand_tilde(config.store_path()?);
  SqliteStore::open(&path, &config.schema)
    .await
    .with_context(|| format!("failed to open store at {}", path.display()))
}

fn exit_code(passed: bool) -> ExitCode {
  if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
