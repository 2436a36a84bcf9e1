pub mod command;
pub mod error;
pub mod interrupt;
pub mod rclone;
pub mod runner;
pub mod upload;

pub use error::RcloneError;
pub use rclone::Rclone;
pub use runner::run_chunk;
