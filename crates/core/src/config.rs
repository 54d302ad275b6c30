//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! request handling never reads process-wide environment variables.

use crate::{PatientError, PatientResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, Default)]
pub struct CoreConfig {
    data_file: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `data_file` is the snapshot to load at startup and rewrite after every mutation. `None`
    /// keeps records in memory only.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::InvalidConfig` if the data file path is an existing directory or
    /// its parent directory does not exist.
    pub fn new(data_file: Option<PathBuf>) -> PatientResult<Self> {
        if let Some(path) = &data_file {
            if path.is_dir() {
                return Err(PatientError::InvalidConfig(format!(
                    "data file {} is a directory",
                    path.display()
                )));
            }

            let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
            if let Some(parent) = parent {
                if !parent.is_dir() {
                    return Err(PatientError::InvalidConfig(format!(
                        "data file directory does not exist: {}",
                        parent.display()
                    )));
                }
            }
        }

        Ok(Self { data_file })
    }

    /// Configuration with no snapshot file.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }
}

/// Parse the data file location from an optional string value.
///
/// `None` or an empty/whitespace value means no data file.
pub fn data_file_from_env_value(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
