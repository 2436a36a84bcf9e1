#[cfg(test)]
pub mod mock;
pub mod transfer_tool;

pub use transfer_tool::{ChunkOutcome, TransferTool, UploadOutcome};
