use std::io::Error as IOError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RcloneError {
    #[error("could not create local log directory {}: {source}", path.display())]
    LogDirError {
        path: PathBuf,
        #[source]
        source: IOError,
    },

    #[error("'{binary}' command not found, is rclone installed and in your PATH?")]
    ToolNotFound { binary: String },

    #[error("could not start '{binary}': {source}")]
    SpawnError {
        binary: String,
        #[source]
        source: IOError,
    },

    #[error("error while waiting for '{binary}': {source}")]
    WaitError {
        binary: String,
        #[source]
        source: IOError,
    },
}
