//! Bootstrap configuration loading and root folder resolution
//!
//! Configuration sources, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "LOGSCOPE_ROOT_FOLDER";

/// Environment variable naming the TOML config file
pub const CONFIG_FILE_ENV: &str = "LOGSCOPE_CONFIG";

const DATABASE_FILE: &str = "logscope.db";
const UPLOADS_DIR: &str = "uploads";
const EXPORTS_DIR: &str = "exports";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

/// Locate the TOML config file
///
/// An explicit path (CLI) or `LOGSCOPE_CONFIG` must exist; the per-user
/// default (`<config dir>/logscope/config.toml`) is optional.
pub fn locate_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return existing(path.to_path_buf()).map(Some);
    }

    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        return existing(PathBuf::from(path)).map(Some);
    }

    let user_config = dirs::config_dir().map(|d| d.join("logscope").join("config.toml"));
    match user_config {
        Some(path) if path.exists() => Ok(Some(path)),
        _ => Ok(None),
    }
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {}", path.display())))
    }
}

/// Load a TOML config file, falling back to `T::default()` when no file is given
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        warn!("No config file found, using built-in defaults");
        return Ok(T::default());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Root folder resolution
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root folder given on the command line (priority 1)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Root folder from the TOML file (priority 3)
    pub fn with_toml_value(mut self, path: Option<PathBuf>) -> Self {
        self.toml_value = path;
        self
    }

    /// Resolve the root folder; never fails
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            debug!("Root folder from command line: {}", path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                debug!("Root folder from {}: {}", ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_value {
            debug!("Root folder from TOML: {}", path.display());
            return path.clone();
        }

        default_root_folder()
    }
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("logscope"))
        .unwrap_or_else(|| PathBuf::from("./logscope_data"))
}

/// Creates and describes the root folder layout
///
/// ```text
/// <root>/logscope.db
/// <root>/uploads/
/// <root>/uploads/exports/
/// ```
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root, uploads and exports directories if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        for dir in [self.root.clone(), self.uploads_dir(), self.exports_dir()] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
                info!("Created directory: {}", dir.display());
            }
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join(UPLOADS_DIR)
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.uploads_dir().join(EXPORTS_DIR)
    }
}
