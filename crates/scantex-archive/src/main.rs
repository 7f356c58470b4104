//! scantex-archive: groups a directory's files by name prefix and
//! packs each group into a `.7z` archive.

use std::path::PathBuf;

use clap::Parser;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use scantex_archive::{ArchiveError, archive_groups};
use scantex_core::config::{AppConfig, ConfigError};
use scantex_core::exec::check_tool_available;
use scantex_core::profile::ToolProfile;

/// Groups files by shared name prefix into per-prefix 7z archives
#[derive(Parser)]
#[command(name = "scantex-archive")]
#[command(about = "Groups files by name prefix into 7z archives", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory whose files are grouped and archived
    source_dir: PathBuf,

    /// Directory that receives the <prefix>.7z archives
    output_dir: PathBuf,

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
        tracing::error!("Archive error: {}", e);
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

async fn run(config: AppConfig, cli: Cli) -> Result<(), ArchiveError> {
    tracing::info!("Starting scantex-archive v{}", env!("CARGO_PKG_VERSION"));

    let profile = ToolProfile::resolve(&config.tools)?;
    if !check_tool_available(&profile.archive_tool).await {
        tracing::warn!(
            tool = %profile.archive_tool.display(),
            "Archive tool not found; archiving will fail"
        );
    }

    let report = archive_groups(&profile.archive_tool, &cli.source_dir, &cli.output_dir).await?;

    tracing::info!(
        archives = report.archives.len(),
        files_archived = report.files_archived,
        "Archiving complete"
    );
    Ok(())
}
