use color_eyre::eyre::Report;
use thiserror::Error;

use crate::config::ConfigError;
use crate::rclone::RcloneError;
use crate::utils::constants::EXIT_SETUP_ERROR;

pub type Result<T> = core::result::Result<T, ChunkRcloneError>;

#[derive(Error, Debug)]
pub enum ChunkRcloneError {
    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("rclone error: {0}")]
    RcloneError(#[from] RcloneError),

    #[error("unexpected error: {0}")]
    UnexpectedError(#[source] Report),
}

impl ChunkRcloneError {
    /// Every local failure ends the process with 1; only rclone's own
    /// failures pass through their codes, and those are not errors here.
    pub fn exit_code(&self) -> i32 {
        EXIT_SETUP_ERROR
    }
}
