use std::path::{Path, PathBuf};

use chrono::Local;

use crate::utils::{
    config::Settings,
    constants::*,
    tools::{join_remote_path, remote_location},
};

pub fn log_timestamp() -> String {
    Local::now().format(LOG_TIMESTAMP_FORMAT).to_string()
}

/// `{basename}_{timestamp}.log`, or `{basename}_{timestamp}_DRYRUN.log`
pub fn log_file_name(basename: &str, timestamp: &str, is_dry_run: bool) -> String {
    let suffix = if is_dry_run { DRY_RUN_SUFFIX } else { "" };
    format!("{}_{}{}.log", basename, timestamp, suffix)
}

/// Arguments of the main bounded copy, in the order rclone receives them
pub fn chunk_args(settings: &Settings, log_file: &Path) -> Vec<String> {
    let mut args = Vec::with_capacity(settings.rclone_flags.len() + 5);
    args.push(COPY_SUBCOMMAND.to_string());
    args.extend(settings.rclone_flags.iter().cloned());
    if settings.is_dry_run {
        args.push(DRY_RUN_FLAG.to_string());
    }
    args.push(format!("--log-file={}", log_file.display()));
    args.push(settings.source_location());
    args.push(settings.destination_location());
    args
}

/// `remote:<remote_log_upload_path>/<log file name>`
pub fn remote_log_destination(remote_name: &str, upload_path: &str, log_file: &Path) -> String {
    let file_name = log_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    remote_location(remote_name, &join_remote_path(upload_path, &file_name))
}

pub fn upload_args(log_file: &Path, destination: &str) -> Vec<String> {
    vec![
        COPYTO_SUBCOMMAND.to_string(),
        log_file.display().to_string(),
        destination.to_string(),
        "--progress".to_string(),
    ]
}

/// Absolute location of the log file for this chunk
pub fn log_file_path(log_dir: &Path, file_name: &str) -> std::io::Result<PathBuf> {
    std::path::absolute(log_dir.join(file_name))
}
