//! Application configuration management.
//!
//! This module handles loading and saving the configuration, which holds the
//! API base URL, the public route set and the storage backend for the
//! session credential.
//!
//! Configuration is stored at `~/.config/sessiongate/config.json`. Environment
//! variables override file values.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::auth::credentials::DEFAULT_SLOT;
use crate::auth::{FileStorage, KeyringStorage, MemoryStorage, Storage, UnavailableStorage};
use crate::routes::table::{DEFAULT_HOME_ROUTE, DEFAULT_LOGIN_ROUTE};
use crate::routes::RouteTable;

/// Application name used for config/cache directory paths and keychain service
const APP_NAME: &str = "sessiongate";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Environment variables for the API base URL, highest priority first
const API_BASE_ENV_VARS: [&str; 2] = ["SESSIONGATE_API_BASE", "NUXT_PUBLIC_API_BASE"];

const STORAGE_ENV_VAR: &str = "SESSIONGATE_STORAGE";

/// Where the session credential is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    Memory,
    None,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "keyring" => Ok(StorageBackend::Keyring),
            "memory" => Ok(StorageBackend::Memory),
            "none" => Ok(StorageBackend::None),
            other => Err(format!(
                "unknown storage backend '{}' (expected file, keyring, memory or none)",
                other
            )),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageBackend::File => "file",
            StorageBackend::Keyring => "keyring",
            StorageBackend::Memory => "memory",
            StorageBackend::None => "none",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub public_routes: Vec<String>,
    pub login_route: String,
    pub home_route: String,
    pub storage_key: String,
    pub request_timeout_secs: u64,
    pub storage_backend: StorageBackend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            public_routes: vec![DEFAULT_LOGIN_ROUTE.to_string()],
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            home_route: DEFAULT_HOME_ROUTE.to_string(),
            storage_key: DEFAULT_SLOT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage_backend: StorageBackend::default(),
        }
    }
}

impl Config {
    /// Load from the user config file (if any), then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_with(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_base) = API_BASE_ENV_VARS
            .iter()
            .filter_map(|key| lookup(*key))
            .find(|value| !value.trim().is_empty())
        {
            self.api_base = api_base.trim().to_string();
        }

        if let Some(backend) = lookup(STORAGE_ENV_VAR) {
            match backend.parse() {
                Ok(backend) => self.storage_backend = backend,
                Err(e) => tracing::warn!(error = %e, "Ignoring {}", STORAGE_ENV_VAR),
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn route_table(&self) -> RouteTable {
        RouteTable::new(&self.public_routes, &self.login_route, &self.home_route)
    }

    /// Build the configured storage capability
    pub fn storage(&self) -> Result<Arc<dyn Storage>> {
        let storage: Arc<dyn Storage> = match self.storage_backend {
            StorageBackend::File => Arc::new(FileStorage::new(self.cache_dir()?)),
            StorageBackend::Keyring => Arc::new(KeyringStorage::new(APP_NAME)),
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
            StorageBackend::None => Arc::new(UnavailableStorage),
        };
        Ok(storage)
    }
}
