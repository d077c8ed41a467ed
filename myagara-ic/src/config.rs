//! Service configuration for myagara-ic
//!
//! Merges command-line / environment overrides with the TOML file and the
//! compiled defaults, highest priority first.

use myagara_common::config::{
    CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use myagara_common::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Module name used for the config file and the health endpoint
pub const MODULE_NAME: &str = "myagara-ic";

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root_folder: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub classifier_url: Option<String>,
    pub classifier_timeout_secs: Option<u64>,
    pub staging_dir: Option<PathBuf>,
    pub max_upload_bytes: Option<usize>,
}

/// Fully resolved service settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub staging_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub classifier_url: String,
    pub classifier_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl ServiceConfig {
    pub fn resolve(overrides: ConfigOverrides, toml: &TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::for_current_platform();

        let root_folder =
            RootFolderResolver::new(overrides.root_folder, toml.root_folder.clone()).resolve();
        let initializer = RootFolderInitializer::new(root_folder.clone());

        let staging_dir = overrides
            .staging_dir
            .or_else(|| toml.staging_dir.clone())
            .unwrap_or_else(|| initializer.default_staging_dir());

        let classifier_url = overrides
            .classifier_url
            .or_else(|| toml.classifier_url.clone())
            .unwrap_or(defaults.classifier_url);
        validate_classifier_url(&classifier_url)?;

        let timeout_secs = overrides
            .classifier_timeout_secs
            .or(toml.classifier_timeout_secs)
            .unwrap_or(defaults.classifier_timeout_secs);
        if timeout_secs == 0 {
            return Err(Error::Config(
                "classifier_timeout_secs must be greater than zero".to_string(),
            ));
        }

        let max_upload_bytes = overrides
            .max_upload_bytes
            .or(toml.max_upload_bytes)
            .unwrap_or(defaults.max_upload_bytes);
        if max_upload_bytes == 0 {
            return Err(Error::Config(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            database_path: initializer.database_path(),
            root_folder,
            staging_dir,
            host: overrides
                .host
                .or_else(|| toml.host.clone())
                .unwrap_or(defaults.host),
            port: overrides.port.or(toml.port).unwrap_or(defaults.port),
            classifier_url,
            classifier_timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes,
        })
    }

    /// Create the root folder if missing, before the database is opened
    pub fn prepare_root_folder(&self) -> Result<()> {
        RootFolderInitializer::new(self.root_folder.clone()).ensure_directory_exists()
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address {}:{}: {}", self.host, self.port, e)))
    }
}

fn validate_classifier_url(url: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| Error::Config(format!("Invalid classifier_url '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Config(format!(
            "classifier_url must use http or https, got '{}'",
            other
        ))),
    }
}
