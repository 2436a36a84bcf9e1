use std::time::Duration;

use async_trait::async_trait;

use crate::rclone::RcloneError;
use crate::utils::constants::{EXIT_INTERRUPTED, EXIT_OK, EXIT_TIMEOUT};

/// How one bounded run of the transfer tool ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    Completed,
    TimedOut,
    Interrupted,
    Failed(i32), // the tool's own exit code, opaque to us
}

impl ChunkOutcome {
    pub fn from_code(code: i32) -> Self {
        match code {
            EXIT_OK => Self::Completed,
            EXIT_TIMEOUT => Self::TimedOut,
            EXIT_INTERRUPTED => Self::Interrupted,
            other => Self::Failed(other),
        }
    }

    /// Process exit status: a timed out or interrupted chunk is a normal cycle end
    pub fn exit_status(&self) -> i32 {
        match *self {
            Self::Failed(code) => code,
            _ => EXIT_OK,
        }
    }
}

/// How the log upload ended. Never affects the exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    Failed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    TimedOut,
    Interrupted,
}

/// Seam over the external transfer tool. Arguments are always passed as a
/// vector, never through a shell.
#[async_trait]
pub trait TransferTool: Send + Sync {
    /// Program name shown in banners
    fn program(&self) -> &str;

    /// Run with inherited stdio, bounded by `limit`. Timeout and operator
    /// interrupt are reported as outcomes, not errors.
    async fn run_bounded(&self, args: &[String], limit: Duration) -> Result<ChunkOutcome, RcloneError>;

    /// Run with captured output, bounded by `limit`
    async fn run_captured(&self, args: &[String], limit: Duration) -> Result<UploadOutcome, RcloneError>;
}
