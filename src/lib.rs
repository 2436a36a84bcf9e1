pub mod config;
pub mod domain;
pub mod error;
pub mod rclone;
pub mod utils;

pub use error::{ChunkRcloneError, Result};

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Report;

use domain::ChunkOutcome;
use rclone::{run_chunk, Rclone};
use utils::config::ConfigPaths;

#[derive(Parser, Debug)]
#[command(name = "chunk-rclone", version)]
#[command(about = "Run `rclone copy` in time-boxed chunks, re-run to continue")]
pub struct Cli {
    /// Control file with overrides for config.toml (default: ./control.toml if present)
    pub control_file: Option<PathBuf>,

    /// Pass --dry-run to rclone and mark the log file name with _DRYRUN
    #[arg(long)]
    pub dry_run: bool,
}

/// Load the configuration from the current directory and run one chunk
pub async fn run(cli: &Cli) -> Result<ChunkOutcome> {
    let paths = ConfigPaths::from_current_dir().map_err(|e| {
        ChunkRcloneError::UnexpectedError(
            Report::new(e).wrap_err("could not determine the working directory"),
        )
    })?;
    run_in(&paths, cli).await
}

pub async fn run_in(paths: &ConfigPaths, cli: &Cli) -> Result<ChunkOutcome> {
    let settings = config::load_effective_config(paths, cli.control_file.as_deref())
        .await?
        .with_dry_run(cli.dry_run);
    let rclone = Rclone::new(settings.rclone_binary.as_str());
    Ok(run_chunk(&rclone, &settings).await?)
}

/// Process exit status for a finished run
pub fn exit_status(result: &Result<ChunkOutcome>) -> i32 {
    match result {
        Ok(outcome) => outcome.exit_status(),
        Err(e) => e.exit_code(),
    }
}
