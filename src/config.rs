//! Local configuration and backend client settings
//!
//! Two independent sources:
//! - `~/.ramorie/config.json` holds the API key and the locally active
//!   project. It is re-read on every use so concurrent CLI invocations and
//!   tool calls always see the latest file.
//! - Client settings (base URL, timeout) come from defaults layered with
//!   environment variables.

use crate::error::{RamorieError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default backend endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://jbraincli-go-backend-production.up.railway.app/v1";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONFIG_DIR: &str = ".ramorie";
const CONFIG_FILE: &str = "config.json";

/// Persisted local state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_project_id: Option<String>,
}

impl LocalConfig {
    /// Treat blank strings written by older clients as unset
    fn normalized(mut self) -> Self {
        self.api_key = self.api_key.filter(|k| !k.trim().is_empty());
        self.active_project_id = self.active_project_id.filter(|p| !p.trim().is_empty());
        self
    }
}

/// File-backed store for [`LocalConfig`]
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.ramorie/config.json`
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            RamorieError::Config(config::ConfigError::Message(
                "could not determine home directory".to_string(),
            ))
        })?;
        Ok(Self::at(home.join(CONFIG_DIR).join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config; a missing file yields an empty config
    pub fn load(&self) -> Result<LocalConfig> {
        let cfg: LocalConfig = Config::builder()
            .add_source(
                File::from(self.path.as_path())
                    .format(FileFormat::Json)
                    .required(false),
            )
            .build()?
            .try_deserialize()?;

        debug!("Loaded local config from {}", self.path.display());
        Ok(cfg.normalized())
    }

    /// Write the config, creating the parent directory if needed
    pub fn save(&self, cfg: &LocalConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(cfg)?;
        std::fs::write(&self.path, data)?;

        debug!("Saved local config to {}", self.path.display());
        Ok(())
    }

    /// Load, apply `f`, save
    pub fn update<F>(&self, f: F) -> Result<LocalConfig>
    where
        F: FnOnce(&mut LocalConfig),
    {
        let mut cfg = self.load()?;
        f(&mut cfg);
        self.save(&cfg)?;
        Ok(cfg)
    }
}

/// Backend client settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientSettings {
    /// Resolve settings: defaults < `API_BASE_URL` < `RAMORIE_*` variables
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?;

        // Legacy variable honoured by earlier CLI releases
        if let Some(legacy) = std::env::var("API_BASE_URL").ok().filter(|v| !v.is_empty()) {
            builder = builder.set_default("api_base_url", legacy)?;
        }

        let settings: ClientSettings = builder
            .add_source(Environment::with_prefix("RAMORIE").try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

/// Render an API key for display without revealing it
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}
