//! Host configuration file (`shotview.toml`).
//!
//! Every section is optional; a missing file is the same as an empty one.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "json"
//!
//! [storage]
//! host_store_path = "/var/lib/shotview/hosts.json"
//!
//! [view]
//! filtered_browsers = ["chrome", "firefox"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::StartupOptions;
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SHOTVIEW_CONFIG";

const CONFIG_FILE: &str = "shotview.toml";
const APP_DIR: &str = "shotview";
const HOST_STORE_FILE: &str = "hosts.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotviewConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub view: ViewConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when no env override is set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Where the base-host override is kept. `None` uses the platform data
    /// directory; an empty string keeps it in memory only.
    pub host_store_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub filtered_browsers: Vec<String>,
}

impl ShotviewConfig {
    /// Load from `path`. The file must exist.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.display().to_string(), e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Load from the resolved path, falling back to defaults when there is
    /// no config file.
    pub fn load_or_default(explicit: Option<&Path>) -> crate::Result<Self> {
        match resolve_config_path(explicit) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        Ok(toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?)
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeFailed(e.to_string()))?)
    }

    /// Startup options for the store. The stored base host is left for the
    /// store to read from its key-value backend.
    #[must_use]
    pub fn startup_options(&self) -> StartupOptions {
        StartupOptions {
            filtered_browsers: self.view.filtered_browsers.clone(),
            stored_base_host: None,
        }
    }

    /// Open the key-value store holding the base-host override.
    pub fn open_host_store(&self) -> crate::Result<Box<dyn KeyValueStore>> {
        let path = match &self.storage.host_store_path {
            Some(path) if path.as_os_str().is_empty() => return Ok(Box::new(MemoryStore::new())),
            Some(path) => path.clone(),
            None => match dirs::data_dir() {
                Some(dir) => dir.join(APP_DIR).join(HOST_STORE_FILE),
                None => {
                    tracing::warn!("No data directory; base host will not be persisted");
                    return Ok(Box::new(MemoryStore::new()));
                }
            },
        };
        Ok(Box::new(JsonFileStore::open(path)?))
    }
}

/// Find the config file to load.
///
/// Precedence: explicit path, then `SHOTVIEW_CONFIG`, then
/// `<config dir>/shotview/shotview.toml` if it exists. Explicit and env paths
/// are returned even when missing so the caller reports the bad path.
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let default = dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE));
    pick_config_path(explicit, from_env, default)
}

fn pick_config_path(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
    default: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = from_env.filter(|p| !p.as_os_str().is_empty()) {
        return Some(path);
    }
    default.filter(|p| p.exists())
}
