//! bundlefs command-line driver.
//!
//! Loads a batch config, streams a directory tree through one batch with
//! the plan optimizer, and writes what comes out.
//!
//! Usage:
//!   bundlefs check --config build.toml
//!   bundlefs run --config build.toml --input src --output dist
//!
//! Set `RUST_LOG=bundlefs_vfs=debug` to trace every filesystem call the
//! optimizer makes.

mod tree;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use bundlefs_pipeline::{Artifact, BatchConfig, PlanOptimizer, run_batch};

/// Run a batch bundler over a directory tree, entirely in memory.
#[derive(Parser, Debug)]
#[command(name = "bundlefs")]
#[command(about = "Run a batch bundler over an in-memory build filesystem")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest a tree, run the configured plan, write the flushed files
    Run {
        /// Batch config (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Directory to ingest
        #[arg(short, long)]
        input: PathBuf,

        /// Directory to write flushed files into
        #[arg(short, long)]
        output: PathBuf,

        /// Batch root; defaults to the config's, or the input directory
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Parse and validate a config without running anything
    Check {
        /// Batch config (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs on stderr, stdout stays free for the summary
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Run {
            config,
            input,
            output,
            base_url,
        } => run(&config, &input, &output, base_url).await,
        Command::Check { config } => check(&config),
    }
}

fn check(path: &Path) -> Result<()> {
    let config = BatchConfig::load(path)
        .with_context(|| format!("loading {}", path.display()))?;
    println!(
        "{}: ok (root {}, {} plan step(s))",
        path.display(),
        config.root(),
        config.plan.len()
    );
    Ok(())
}

async fn run(
    config_path: &Path,
    input: &Path,
    output: &Path,
    base_url: Option<String>,
) -> Result<()> {
    let mut config = BatchConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let input = dunce::canonicalize(input)
        .with_context(|| format!("input directory {}", input.display()))?;

    config.base_url = match base_url {
        Some(url) => url,
        None if config.base_url == "." => input.to_string_lossy().into_owned(),
        None => config.base_url,
    };
    info!(root = %config.root(), input = %input.display(), "loading input tree");

    let artifacts = {
        let input = input.clone();
        tokio::task::spawn_blocking(move || tree::read_tree(&input)).await??
    };

    let (tx, rx) = mpsc::channel::<Artifact>(64);
    let writer = tokio::spawn(write_all(output.to_path_buf(), rx));

    let optimizer = PlanOptimizer::from_config(&config);
    let report = run_batch(config, &optimizer, futures::stream::iter(artifacts), tx).await;
    let written = writer.await??;
    let report = report?;

    info!(
        ingested = report.ingested,
        emitted = report.emitted,
        written,
        "batch complete"
    );
    println!("{} -> {} file(s) in {}", report.response, written, output.display());
    Ok(())
}

/// Drain the flush channel into `output`.
async fn write_all(output: PathBuf, mut rx: mpsc::Receiver<Artifact>) -> Result<usize> {
    let mut written = 0;
    while let Some(artifact) = rx.recv().await {
        if tree::write_artifact(&output, &artifact).await? {
            written += 1;
        }
    }
    Ok(written)
}
