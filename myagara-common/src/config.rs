//! Configuration file model and root folder resolution
//!
//! Configuration sources, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default
//!
//! A missing or invalid TOML file is never fatal: the service continues
//! with compiled defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "MYAGARA_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "myagara.db";

/// Default staging sub-directory inside the root folder
pub const STAGING_DIR_NAME: &str = "staging";

/// Compiled-in defaults used when no other source provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub host: String,
    pub port: u16,
    pub classifier_url: String,
    pub classifier_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5780,
            classifier_url: "http://localhost:5000/classify".to_string(),
            classifier_timeout_secs: 30,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Contents of `myagara-ic.toml`
///
/// Every field is optional; absent values fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Remote classifier endpoint (POST, multipart field `image`)
    #[serde(default)]
    pub classifier_url: Option<String>,

    #[serde(default)]
    pub classifier_timeout_secs: Option<u64>,

    /// Directory uploaded images are staged in before classification
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,

    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[logging]` table
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

/// Outcome of looking for a TOML config file
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigFileStatus {
    Loaded(PathBuf),
    Missing,
    Invalid { path: PathBuf, error: String },
}

/// Load the TOML config for `module_name`, falling back to defaults
///
/// `explicit_path` (from `--config`) is tried first, then the platform
/// config directory. A missing or unreadable file yields
/// `TomlConfig::default()`; the returned status says which case applied so
/// the caller can log it once tracing is up.
pub fn load_toml_config_or_default(
    explicit_path: Option<&Path>,
    module_name: &str,
) -> (TomlConfig, ConfigFileStatus) {
    let path = match explicit_path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path(module_name) {
            Some(p) => p,
            None => return (TomlConfig::default(), ConfigFileStatus::Missing),
        },
    };

    if !path.exists() {
        return (TomlConfig::default(), ConfigFileStatus::Missing);
    }

    match load_toml_config(&path) {
        Ok(config) => (config, ConfigFileStatus::Loaded(path)),
        Err(e) => (
            TomlConfig::default(),
            ConfigFileStatus::Invalid {
                path,
                error: e.to_string(),
            },
        ),
    }
}

/// Platform config file location: `<config_dir>/myagara/<module_name>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("myagara").join(format!("{}.toml", module_name)))
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("myagara"))
        .unwrap_or_else(|| PathBuf::from("./myagara_data"))
}

/// Resolves the root folder holding the database and staging directory
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, toml_root: Option<PathBuf>) -> Self {
        Self { cli_arg, toml_root }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            return path.clone();
        }

        default_root_folder()
    }
}

/// Prepares the resolved root folder on disk
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the root folder if missing (idempotent)
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            Error::Config(format!(
                "Failed to create root folder {}: {}",
                self.root.display(),
                e
            ))
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE_NAME)
    }

    pub fn default_staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR_NAME)
    }
}
