use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use config::{File, FileFormat, Map, Source, Value, ValueKind};
use log::info;
use tokio::fs;

use super::error::ConfigError;
use super::merge::{merge_sections, Sections};
use crate::utils::{
    config::{ConfigPaths, Settings},
    constants::*,
};

/// Load config.toml, merge the control file on top of it and validate the result.
///
/// An explicitly named control file must exist; the default control file is
/// optional and its absence only produces an informational note.
pub async fn load_effective_config(
    paths: &ConfigPaths,
    control_file: Option<&Path>,
) -> Result<Settings, ConfigError> {
    let base_path = paths.base_file();
    let mut effective = read_sections(&base_path).await?;
    info!("Loaded base configuration from '{}'", base_path.display());

    let control_path = match control_file {
        Some(given) => {
            let resolved = paths.resolve_control_file(given).ok_or_else(|| {
                ConfigError::ControlFileNotFound {
                    path: given.to_path_buf(),
                }
            })?;
            info!("Custom control file specified: '{}'", resolved.display());
            Some(resolved)
        }
        None => {
            let default_path = paths.default_control_file();
            if default_path.is_file() {
                info!("Using default control file: '{}'", default_path.display());
                Some(default_path)
            } else {
                info!(
                    "No control file specified and default '{}' not found in '{}', proceeding with '{}' only",
                    paths.default_control_file_name,
                    paths.working_dir.display(),
                    paths.base_file_name
                );
                None
            }
        }
    };

    if let Some(control_path) = control_path {
        let control = read_sections(&control_path).await?;
        merge_sections(&mut effective, control);
        info!(
            "Settings from '{}' have been merged over the base configuration",
            control_path.display()
        );
    }

    let settings = extract_settings(&effective)?;
    info!("Effective configuration loaded and validated successfully");
    Ok(settings)
}

async fn read_sections(path: &Path) -> Result<Sections, ConfigError> {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::ConfigMissing {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(ConfigError::ConfigIOError {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_sections(path, &text)
}

/// Parse TOML text into a tree of sections
pub fn parse_sections(path: &Path, text: &str) -> Result<Sections, ConfigError> {
    File::from_str(text, FileFormat::Toml)
        .collect()
        .map_err(|source| ConfigError::ConfigParseError {
            path: path.to_path_buf(),
            source,
        })
}

/// Turn the merged tree into a validated `Settings` record
pub fn extract_settings(tree: &Sections) -> Result<Settings, ConfigError> {
    let run_description = match tree.get("run_description") {
        Some(value) => as_string(value, "top level", "run_description")?,
        None => DEFAULT_RUN_DESCRIPTION.to_string(),
    };

    let paths = section(tree, SECTION_PATHS)?;
    let remote_name = optional_string(paths, SECTION_PATHS, "remote_name")?;
    let source_path = optional_string(paths, SECTION_PATHS, "source_path")?;
    let dest_parent_path = optional_string(paths, SECTION_PATHS, "destination_parent_path")?;
    let backup_folder_name = optional_string(paths, SECTION_PATHS, "backup_folder_name")?;

    let mut missing = Vec::new();
    if remote_name.as_deref().map_or(true, str::is_empty) {
        missing.push("remote_name");
    }
    if source_path.as_deref().map_or(true, str::is_empty) {
        missing.push("source_path");
    }
    if dest_parent_path.is_none() {
        missing.push("destination_parent_path"); // "" is the remote root and valid
    }
    if backup_folder_name.as_deref().map_or(true, str::is_empty) {
        missing.push("backup_folder_name");
    }
    if !missing.is_empty() {
        return Err(ConfigError::validation(
            SECTION_PATHS,
            format!(
                "missing or empty required field(s): {}; they must be set after merging the base and control files",
                missing.join(", ")
            ),
        ));
    }

    let options = section(tree, SECTION_OPTIONS)?;
    let rclone_flags = flags(options)?;
    let rclone_binary = optional_string(options, SECTION_OPTIONS, "binary")?
        .unwrap_or_else(|| DEFAULT_RCLONE_BINARY.to_string());
    if rclone_binary.is_empty() {
        return Err(ConfigError::validation(
            SECTION_OPTIONS,
            "'binary' must not be empty",
        ));
    }

    let chunking = section(tree, SECTION_CHUNKING)?;
    let run_duration_seconds = run_duration(chunking)?;

    let logging = section(tree, SECTION_LOGGING)?;
    let log_dir = optional_string(logging, SECTION_LOGGING, "log_dir")?
        .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string());
    let log_file_basename = optional_string(logging, SECTION_LOGGING, "log_file_basename")?
        .unwrap_or_else(|| DEFAULT_LOG_FILE_BASENAME.to_string());
    let upload_logs_to_remote = match logging.and_then(|t| t.get("upload_logs_to_remote")) {
        None => false,
        Some(Value {
            kind: ValueKind::Boolean(flag),
            ..
        }) => *flag,
        Some(other) => {
            return Err(ConfigError::validation(
                SECTION_LOGGING,
                format!("'upload_logs_to_remote' must be a boolean, got '{}'", other),
            ))
        }
    };
    let remote_log_upload_path =
        optional_string(logging, SECTION_LOGGING, "remote_log_upload_path")?
            .filter(|path| !path.is_empty());

    Ok(Settings {
        run_description,
        remote_name: remote_name.unwrap_or_default(),
        source_path: source_path.unwrap_or_default(),
        dest_parent_path: dest_parent_path.unwrap_or_default(),
        backup_folder_name: backup_folder_name.unwrap_or_default(),
        rclone_binary,
        rclone_flags,
        run_duration_seconds,
        log_dir: PathBuf::from(log_dir),
        log_file_basename,
        upload_logs_to_remote,
        remote_log_upload_path,
        is_dry_run: false,
    })
}

fn section<'a>(tree: &'a Sections, name: &str) -> Result<Option<&'a Map<String, Value>>, ConfigError> {
    match tree.get(name) {
        None => Ok(None),
        Some(Value {
            kind: ValueKind::Table(table),
            ..
        }) => Ok(Some(table)),
        Some(other) => Err(ConfigError::validation(
            name,
            format!("expected a section (table), got '{}'", other),
        )),
    }
}

fn as_string(value: &Value, section: &str, key: &str) -> Result<String, ConfigError> {
    match &value.kind {
        ValueKind::String(s) => Ok(s.clone()),
        _ => Err(ConfigError::validation(
            section,
            format!("'{}' must be a string, got '{}'", key, value),
        )),
    }
}

fn optional_string(
    table: Option<&Map<String, Value>>,
    section: &str,
    key: &str,
) -> Result<Option<String>, ConfigError> {
    table
        .and_then(|t| t.get(key))
        .map(|value| as_string(value, section, key))
        .transpose()
}

fn flags(options: Option<&Map<String, Value>>) -> Result<Vec<String>, ConfigError> {
    let items = match options.and_then(|t| t.get("flags")) {
        None => return Ok(Vec::new()),
        Some(Value {
            kind: ValueKind::Array(items),
            ..
        }) => items,
        Some(other) => {
            return Err(ConfigError::validation(
                SECTION_OPTIONS,
                format!("'flags' must be an array, got '{}'", other),
            ))
        }
    };

    items
        .iter()
        .map(|item| match &item.kind {
            ValueKind::String(s) => Ok(s.clone()),
            ValueKind::Boolean(_)
            | ValueKind::I64(_)
            | ValueKind::I128(_)
            | ValueKind::U64(_)
            | ValueKind::U128(_)
            | ValueKind::Float(_) => Ok(item.to_string()),
            _ => Err(ConfigError::validation(
                SECTION_OPTIONS,
                format!("'flags' entries must be scalar values, got '{}'", item),
            )),
        })
        .collect()
}

fn run_duration(chunking: Option<&Map<String, Value>>) -> Result<u64, ConfigError> {
    let value = chunking
        .and_then(|t| t.get("run_duration_seconds"))
        .ok_or_else(|| {
            ConfigError::validation(
                SECTION_CHUNKING,
                "missing required field 'run_duration_seconds' (positive integer)",
            )
        })?;

    let seconds = match value.kind {
        ValueKind::I64(n) => u64::try_from(n).ok(),
        ValueKind::U64(n) => Some(n),
        ValueKind::I128(n) => u64::try_from(n).ok(),
        ValueKind::U128(n) => u64::try_from(n).ok(),
        _ => None,
    };

    match seconds {
        Some(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::validation(
            SECTION_CHUNKING,
            format!(
                "invalid 'run_duration_seconds' ({}), must be a positive integer",
                value
            ),
        )),
    }
}
