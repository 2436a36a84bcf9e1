use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{ChunkOutcome, TransferTool, UploadOutcome};
use crate::rclone::RcloneError;

/// In-memory transfer tool: records every invocation, answers with scripted outcomes
pub struct MockTool {
    pub chunk: Result<ChunkOutcome, fn() -> RcloneError>,
    pub upload: UploadOutcome,
    pub calls: Mutex<Vec<(Vec<String>, Duration)>>,
}

impl MockTool {
    pub fn returning(outcome: ChunkOutcome) -> Self {
        Self {
            chunk: Ok(outcome),
            upload: UploadOutcome::Uploaded,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: fn() -> RcloneError) -> Self {
        Self {
            chunk: Err(error),
            ..Self::returning(ChunkOutcome::Completed)
        }
    }

    pub fn with_upload(mut self, upload: UploadOutcome) -> Self {
        self.upload = upload;
        self
    }

    pub fn calls(&self) -> Vec<(Vec<String>, Duration)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferTool for MockTool {
    fn program(&self) -> &str {
        "rclone"
    }

    async fn run_bounded(&self, args: &[String], limit: Duration) -> Result<ChunkOutcome, RcloneError> {
        self.calls.lock().unwrap().push((args.to_vec(), limit));
        self.chunk.map_err(|error| error())
    }

    async fn run_captured(&self, args: &[String], limit: Duration) -> Result<UploadOutcome, RcloneError> {
        self.calls.lock().unwrap().push((args.to_vec(), limit));
        Ok(self.upload.clone())
    }
}
