//! preset-convert - batch converter for audio plugin presets
//!
//! Summarizes `.vstpreset`, `.fxp`/`.fxb`, `.ffp`, `.wav` and `.aif(f)` files,
//! unwraps VST3 component data and re-wraps FXP records as VST3 presets.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use preset_convert::{ConvertConfig, batch};

#[derive(Parser)]
#[command(name = "preset-convert")]
#[command(about = "Batch converter for audio plugin preset files")]
#[command(version)]
struct Cli {
    /// Directory to scan recursively
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for converted files (mirrors the input tree)
    #[arg(short, long)]
    output: PathBuf,

    /// Optional TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Worker threads (default: one per core)
    #[arg(short, long)]
    jobs: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let config = match &cli.config {
        Some(path) => ConvertConfig::load(path)?,
        None => ConvertConfig::default(),
    };

    let report = batch::run(&cli.input, &cli.output, &config, cli.jobs)?;

    tracing::info!(
        "Done: {} converted, {} skipped, {} failed",
        report.converted,
        report.skipped,
        report.failed.len()
    );
    for (path, err) in &report.failed {
        tracing::warn!("  {}: {}", path.display(), err);
    }

    Ok(())
}
