//! User configuration: default paths and default filters

use crate::domain::FilterSpec;
use crate::error::{MigrationError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Source directory used when none is configured or given.
pub const DEFAULT_SOURCE: &str = ".";
/// Destination directory used when none is configured or given.
pub const DEFAULT_DESTINATION: &str = "migrated";

/// A config value that may be a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Filter block as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub name_pattern: Option<OneOrMany>,
    pub file_type: Option<OneOrMany>,
    pub min_size_mb: Option<f64>,
    pub max_size_mb: Option<f64>,
}

impl From<FilterConfig> for FilterSpec {
    fn from(config: FilterConfig) -> Self {
        FilterSpec::new()
            .with_name_patterns(config.name_pattern.map(OneOrMany::into_vec).unwrap_or_default())
            .with_types(config.file_type.map(OneOrMany::into_vec).unwrap_or_default())
            .with_min_size_mb(config.min_size_mb)
            .with_max_size_mb(config.max_size_mb)
    }
}

/// Defaults applied when the command line leaves something unset.
///
/// `files` / `folders` set to `None` disable that migration kind unless the
/// command line enables it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub files: Option<FilterConfig>,
    pub folders: Option<FilterConfig>,
    pub copy_mode: bool,
    pub dry_run: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            destination: PathBuf::from(DEFAULT_DESTINATION),
            files: None,
            folders: None,
            copy_mode: false,
            dry_run: false,
        }
    }
}

impl UserConfig {
    /// Get the config file path (~/.config/fmig/config.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fmig").join("config.json"))
    }

    /// Load the config at the standard location, or the built-in defaults if there is none
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load an explicitly named config file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            MigrationError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&contents).map_err(|e| match e {
            MigrationError::Config(msg) => {
                MigrationError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| MigrationError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn file_spec(&self) -> Option<FilterSpec> {
        self.files.clone().map(FilterSpec::from)
    }

    pub fn folder_spec(&self) -> Option<FilterSpec> {
        self.folders.clone().map(FilterSpec::from)
    }
}
