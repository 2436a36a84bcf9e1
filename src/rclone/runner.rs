use log::{info, warn};
use tokio::fs;

use crate::domain::{ChunkOutcome, TransferTool, UploadOutcome};
use crate::rclone::{
    command::{chunk_args, log_file_name, log_file_path, log_timestamp},
    error::RcloneError,
    upload::upload_log,
};
use crate::utils::{config::Settings, constants::RCLONE_EXIT_CODES_DOC, tools::display_command};

const RULE_WIDTH: usize = 70;

/// Run one bounded chunk of `rclone copy`, then optionally upload its log.
///
/// Errors are local setup failures (log directory, missing binary). Anything
/// rclone itself reports comes back as a `ChunkOutcome`.
pub async fn run_chunk<T>(tool: &T, settings: &Settings) -> Result<ChunkOutcome, RcloneError>
where
    T: TransferTool + ?Sized,
{
    let source = settings.source_location();
    let destination = settings.destination_location();

    fs::create_dir_all(&settings.log_dir)
        .await
        .map_err(|source| RcloneError::LogDirError {
            path: settings.log_dir.clone(),
            source,
        })?;

    let timestamp = log_timestamp();
    let file_name = log_file_name(&settings.log_file_basename, &timestamp, settings.is_dry_run);
    let log_file = log_file_path(&settings.log_dir, &file_name).map_err(|source| {
        RcloneError::LogDirError {
            path: settings.log_dir.clone(),
            source,
        }
    })?;
    let args = chunk_args(settings, &log_file);

    info!("{}", "=".repeat(RULE_WIDTH));
    info!("Starting rclone chunk: {} at {}", settings.run_description, timestamp);
    if settings.is_dry_run {
        info!("  Mode:         DRY RUN (no data will be transferred)");
    }
    info!("  Source:       {}", source);
    info!("  Destination:  {}", destination);
    info!("  Max duration: {} seconds", settings.run_duration_seconds);
    info!("  Rclone log:   {}", log_file.display());
    info!("  Executing:    {}", display_command(tool.program(), &args));
    info!("{}", "-".repeat(RULE_WIDTH));
    info!(
        "Rclone process starting, it will run for up to {} seconds",
        settings.run_duration_seconds
    );
    info!("Monitor progress in '{}'", log_file.display());
    info!("Press Ctrl+C to ask rclone for a graceful shutdown before the timeout");

    let outcome = tool.run_bounded(&args, settings.run_duration()).await?;

    info!("{}", "-".repeat(RULE_WIDTH));
    match outcome {
        ChunkOutcome::Completed => {
            info!("Rclone chunk completed successfully (all work was done within the duration)")
        }
        ChunkOutcome::TimedOut => {
            info!("Rclone chunk was terminated due to timeout (as scheduled)")
        }
        ChunkOutcome::Interrupted => info!("Rclone chunk was terminated by user interrupt"),
        ChunkOutcome::Failed(code) => {
            warn!("Rclone process exited with code {}, this indicates rclone errors", code);
            warn!("Refer to {} for exit code meanings", RCLONE_EXIT_CODES_DOC);
            warn!("Check the detailed rclone log: {}", log_file.display());
        }
    }
    info!("Log file for this run: {}", log_file.display());

    if settings.upload_logs_to_remote
        && upload_log(tool, settings, &log_file).await != Some(UploadOutcome::Uploaded)
    {
        info!("Log for this run stays local only: {}", log_file.display());
    }
    info!("{}", "=".repeat(RULE_WIDTH));

    Ok(outcome)
}
