use std::io::Error as IOError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {}", path.display())]
    ConfigMissing { path: PathBuf },

    #[error("could not read configuration file {}: {source}", path.display())]
    ConfigIOError {
        path: PathBuf,
        #[source]
        source: IOError,
    },

    #[error("could not parse configuration file {}: {source}", path.display())]
    ConfigParseError {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("specified control file not found: {}", path.display())]
    ControlFileNotFound { path: PathBuf },

    #[error("invalid configuration in [{section}]: {message}")]
    ConfigValidationError { section: String, message: String },
}

impl ConfigError {
    pub fn validation(section: &str, message: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            section: section.to_string(),
            message: message.into(),
        }
    }
}
