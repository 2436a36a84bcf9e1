use std::time::Instant;

use clap::Parser;
use color_eyre::Result;
use log::{error, info, warn};

use chunk_rclone::utils::constants::{BASE_CONFIG_NAME, EXIT_OK};
use chunk_rclone::utils::logger::init_logger;
use chunk_rclone::{exit_status, run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_logger();

    let cli = Cli::parse();
    let now = Instant::now();
    info!(
        "--- Starting chunked rclone copy orchestrator (using '{}') ---",
        BASE_CONFIG_NAME
    );

    let result = run(&cli).await;
    let status = exit_status(&result);
    match &result {
        Ok(_) if status == EXIT_OK => {
            info!("--- Chunk processing cycle finished, elapsed: {:.2?} ---", now.elapsed());
            info!("--- To continue copying remaining files, simply re-run this program ---");
        }
        Ok(_) => {
            warn!("--- Rclone reported an error (exit code: {}), please check the logs ---", status);
            warn!("--- You may still be able to re-run this program to retry ---");
        }
        Err(e) => {
            error!("{}", e);
            error!("--- Setup failed (exit code: {}), no transfer was attempted or completed ---", status);
        }
    }

    std::process::exit(status)
}
