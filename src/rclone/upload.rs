use std::path::Path;

use log::{error, info, warn};

use crate::domain::{TransferTool, UploadOutcome};
use crate::rclone::command::{remote_log_destination, upload_args};
use crate::utils::{config::Settings, constants::LOG_UPLOAD_TIMEOUT};

/// Copy the chunk log to the remote. Every failure is logged and swallowed;
/// `None` means the upload was skipped.
pub async fn upload_log<T>(tool: &T, settings: &Settings, log_file: &Path) -> Option<UploadOutcome>
where
    T: TransferTool + ?Sized,
{
    let upload_path = match settings.remote_log_upload_path.as_deref() {
        Some(path) if !settings.remote_name.is_empty() => path,
        _ => {
            warn!(
                "'upload_logs_to_remote' is true but 'remote_log_upload_path' and/or 'remote_name' is not set, cannot upload log"
            );
            return None;
        }
    };

    let destination = remote_log_destination(&settings.remote_name, upload_path, log_file);
    info!("Attempting to upload log file to: {}", destination);

    let args = upload_args(log_file, &destination);
    let outcome = match tool.run_captured(&args, LOG_UPLOAD_TIMEOUT).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Log upload could not be started: {}", e);
            return None;
        }
    };

    match &outcome {
        UploadOutcome::Uploaded => info!("Log file uploaded successfully"),
        UploadOutcome::TimedOut => warn!(
            "Timeout after {} seconds during log upload to {}",
            LOG_UPLOAD_TIMEOUT.as_secs(),
            destination
        ),
        UploadOutcome::Interrupted => warn!("Log upload to {} was interrupted", destination),
        UploadOutcome::Failed {
            code,
            stdout,
            stderr,
        } => {
            warn!(
                "Failed to upload log file '{}', rclone exit code: {}",
                log_file.display(),
                code.map_or_else(|| "none".to_string(), |c| c.to_string())
            );
            if !stdout.is_empty() {
                warn!("Rclone stdout (log upload):\n{}", stdout);
            }
            if !stderr.is_empty() {
                warn!("Rclone stderr (log upload):\n{}", stderr);
            }
        }
    }
    Some(outcome)
}
