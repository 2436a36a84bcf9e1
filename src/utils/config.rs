use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use super::constants::{BASE_CONFIG_NAME, DEFAULT_CONTROL_NAME};
use super::tools::{join_remote_path, remote_location};

/// Effective settings for one chunk, built from config.toml + control file + CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub run_description: String,
    pub remote_name: String,              // rclone remote, e.g. "gdrive"
    pub source_path: String,              // path on the remote to copy from
    pub dest_parent_path: String,         // "" means the remote root
    pub backup_folder_name: String,       // created under dest_parent_path
    pub rclone_binary: String,            // program name or path of rclone
    pub rclone_flags: Vec<String>,        // passed through verbatim
    pub run_duration_seconds: u64,        // wall-clock bound of one chunk
    pub log_dir: PathBuf,                 // local directory for chunk logs
    pub log_file_basename: String,        // prefix of generated log names
    pub upload_logs_to_remote: bool,      // copy the log to the remote after the run
    pub remote_log_upload_path: Option<String>,
    pub is_dry_run: bool, // from the command line only
}

impl Settings {
    pub fn with_dry_run(mut self, is_dry_run: bool) -> Self {
        self.is_dry_run = is_dry_run;
        self
    }

    pub fn source_location(&self) -> String {
        remote_location(&self.remote_name, &self.source_path)
    }

    pub fn destination_location(&self) -> String {
        remote_location(
            &self.remote_name,
            &join_remote_path(&self.dest_parent_path, &self.backup_folder_name),
        )
    }

    pub fn run_duration(&self) -> Duration {
        Duration::from_secs(self.run_duration_seconds)
    }
}

/// Where the loader looks for its files. Injected so tests can use a scratch dir.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub working_dir: PathBuf,
    pub base_file_name: String,
    pub default_control_file_name: String,
}

impl ConfigPaths {
    pub fn new<P: Into<PathBuf>>(working_dir: P) -> Self {
        Self {
            working_dir: working_dir.into(),
            base_file_name: BASE_CONFIG_NAME.to_string(),
            default_control_file_name: DEFAULT_CONTROL_NAME.to_string(),
        }
    }

    pub fn from_current_dir() -> io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn base_file(&self) -> PathBuf {
        self.working_dir.join(&self.base_file_name)
    }

    pub fn default_control_file(&self) -> PathBuf {
        self.working_dir.join(&self.default_control_file_name)
    }

    /// Resolve an explicitly named control file: as given first, then
    /// relative to the working directory.
    pub fn resolve_control_file(&self, given: &Path) -> Option<PathBuf> {
        if given.is_file() {
            return Some(given.to_path_buf());
        }
        if given.is_relative() {
            let candidate = self.working_dir.join(given);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}
