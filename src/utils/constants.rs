use std::time::Duration;

pub const BASE_CONFIG_NAME: &str = "config.toml"; // base config must exist
pub const DEFAULT_CONTROL_NAME: &str = "control.toml"; // optional overrides

pub const DEFAULT_RUN_DESCRIPTION: &str = "Chunked Run";
pub const DEFAULT_RCLONE_BINARY: &str = "rclone";
pub const DEFAULT_LOG_DIR: &str = "rclone_chunk_logs_py";
pub const DEFAULT_LOG_FILE_BASENAME: &str = "rclone_copy_chunk";

pub const SECTION_PATHS: &str = "rclone_paths";
pub const SECTION_OPTIONS: &str = "rclone_options";
pub const SECTION_CHUNKING: &str = "chunking";
pub const SECTION_LOGGING: &str = "logging";

pub const COPY_SUBCOMMAND: &str = "copy";
pub const COPYTO_SUBCOMMAND: &str = "copyto";
pub const DRY_RUN_FLAG: &str = "--dry-run";
pub const DRY_RUN_SUFFIX: &str = "_DRYRUN";
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const EXIT_OK: i32 = 0;
pub const EXIT_SETUP_ERROR: i32 = 1;
pub const EXIT_TIMEOUT: i32 = 124; // same convention as coreutils `timeout`
pub const EXIT_INTERRUPTED: i32 = 130; // 128 + SIGINT

pub const INTERRUPT_GRACE: Duration = Duration::from_millis(250);
pub const LOG_UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);
pub const RCLONE_EXIT_CODES_DOC: &str = "https://rclone.org/docs/#exit-code";
