//! scantex: textured-mesh pipeline driver.
//!
//! Entry point that resolves the platform tool profile and runs the
//! pipeline over a single scan or a whole directory of scans.

use std::path::PathBuf;

use clap::Parser;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use scantex_core::config::{AppConfig, ConfigError};
use scantex_core::profile::ToolProfile;
use scantex_pipeline::{Job, PipelineError, PipelineProcessor, run_batch};

/// Builds textured meshes from colored 3D scans
#[derive(Parser)]
#[command(name = "scantex")]
#[command(about = "Builds textured meshes from colored 3D scans", long_about = None)]
#[command(version)]
struct Cli {
    /// Input mesh file, or a directory of meshes with --batch
    input: PathBuf,

    /// Output mesh file, or a directory for per-scan outputs with --batch
    output: PathBuf,

    /// Process every file in the input directory
    #[arg(long)]
    batch: bool,

    /// Path to the configuration file
    #[arg(long, default_value = "config/default.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config, cli).await {
        tracing::error!("Pipeline error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration(cli: &Cli) -> Result<AppConfig, ConfigError> {
    AppConfig::load(&cli.config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main pipeline run function
async fn run(config: AppConfig, cli: Cli) -> Result<(), PipelineError> {
    tracing::info!("Starting scantex v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Resolve the platform tool profile ────────────────
    let profile = ToolProfile::resolve(&config.tools)?;

    // ── Step 2: Create the processor ─────────────────────────────
    let processor = PipelineProcessor::new(profile, config.pipeline.clone())?;
    processor.profile().check_pipeline_tools().await;

    // ── Step 3: Run the requested mode ───────────────────────────
    if cli.batch {
        run_batch_mode(&processor, &cli).await
    } else {
        run_single_mode(&processor, &cli).await
    }
}

/// Process one scan file into one output mesh.
async fn run_single_mode(processor: &PipelineProcessor, cli: &Cli) -> Result<(), PipelineError> {
    let job = Job::new(&cli.input, &cli.output)?;
    let outcome = processor.process(&job).await?;

    tracing::info!(
        output = %outcome.output.display(),
        duration_ms = outcome.duration.as_millis() as u64,
        "Pipeline complete"
    );
    Ok(())
}

/// Process every file in the input directory, then report the tally.
///
/// Individual item failures do not abort the run; they are logged and
/// turned into a non-zero exit at the end.
async fn run_batch_mode(processor: &PipelineProcessor, cli: &Cli) -> Result<(), PipelineError> {
    let summary = run_batch(processor, &cli.input, &cli.output).await?;

    let snapshot = processor.metrics_snapshot();
    tracing::info!(
        completed = summary.completed.len(),
        failed = summary.failed.len(),
        duration_p50 = ?snapshot.duration_p50,
        duration_p95 = ?snapshot.duration_p95,
        "Batch complete"
    );

    if !summary.all_succeeded() {
        for item in &summary.failed {
            tracing::error!(
                input = %item.input.display(),
                error = %item.error,
                "Batch item failed"
            );
        }
        std::process::exit(2);
    }
    Ok(())
}
