use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::backend::hosted::{HostedConfig, DEFAULT_PROVISION_RPC, DEFAULT_RUNS_TABLE};
use crate::constants::DEFAULT_PORT;

/// Environment variable consulted when `anon_key` is absent from the file
pub const ANON_KEY_ENV: &str = "BRISK_ANON_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_bind() -> String {
    "[::]".to_string()
}

fn default_provision_rpc() -> String {
    DEFAULT_PROVISION_RPC.to_string()
}

fn default_runs_table() -> String {
    DEFAULT_RUNS_TABLE.to_string()
}

/// Server configuration file structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Port to listen on (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Address to bind (default: [::], IPv4 + IPv6)
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Storage/auth backend (maps to [backend] section in TOML)
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Hosted Supabase-style project
    Hosted(HostedSettings),
    /// Local SQLite file
    Local(LocalSettings),
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostedSettings {
    /// Project URL
    pub url: String,
    /// Public anon key (falls back to BRISK_ANON_KEY)
    pub anon_key: Option<String>,
    /// Procedure that prepares a user's run storage (default: create_runs_table)
    #[serde(default = "default_provision_rpc")]
    pub provision_rpc: String,
    /// Table holding every user's runs (default: runs)
    #[serde(default = "default_runs_table")]
    pub runs_table: String,
    /// Per-request timeout; unset means wait indefinitely
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalSettings {
    /// Path to the SQLite database file (created if missing)
    pub sqlite_file: PathBuf,
}

impl AppConfig {
    /// Read, parse and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Check the backend section for values that would only fail at request time
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.backend {
            BackendConfig::Hosted(hosted) => {
                let url = url::Url::parse(&hosted.url).map_err(|e| {
                    ConfigError::Invalid(format!("backend.url '{}' is not a valid URL: {}", hosted.url, e))
                })?;
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(ConfigError::Invalid(format!(
                        "backend.url must be http or https, got '{}'",
                        url.scheme()
                    )));
                }
                for (field, value) in [
                    ("provision_rpc", &hosted.provision_rpc),
                    ("runs_table", &hosted.runs_table),
                ] {
                    if !is_identifier(value) {
                        return Err(ConfigError::Invalid(format!(
                            "backend.{} '{}' must contain only letters, digits and underscores",
                            field, value
                        )));
                    }
                }
                hosted.resolve_anon_key()?;
                Ok(())
            }
            BackendConfig::Local(local) => {
                if local.sqlite_file.as_os_str().is_empty() {
                    return Err(ConfigError::Invalid(
                        "backend.sqlite_file must not be empty".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

impl HostedSettings {
    /// The anon key from the file, else from the environment
    pub fn resolve_anon_key(&self) -> Result<String, ConfigError> {
        if let Some(key) = self.anon_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.trim().to_string());
        }
        std::env::var(ANON_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "backend.anon_key is not set and {} is not in the environment",
                    ANON_KEY_ENV
                ))
            })
    }

    pub fn to_hosted_config(&self) -> Result<HostedConfig, ConfigError> {
        Ok(HostedConfig {
            url: self.url.clone(),
            anon_key: self.resolve_anon_key()?,
            provision_rpc: self.provision_rpc.clone(),
            runs_table: self.runs_table.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        })
    }
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
