use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment override for the access token. Takes precedence over the
/// config file when set to a non-empty value.
pub const TOKEN_ENV_VAR: &str = "VGU_ACCESS_TOKEN";

const CONFIG_DIR: &str = "vgu";
const CONFIG_FILE: &str = "config.json";

/// On-disk settings. Only the access token is required today.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub access_token: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no access token: set VGU_ACCESS_TOKEN or create {0} with {{\"access_token\": \"...\"}}")]
    Missing(String),
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("access token in {0} is empty")]
    EmptyToken(String),
}

impl AppConfig {
    /// Token from the environment first, then from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_path())
    }

    /// Env override first, then the given file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.trim().is_empty() {
                return Ok(Self { access_token: token });
            }
        }
        Self::from_file(path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.display().to_string()));
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.access_token.trim().is_empty() {
            return Err(ConfigError::EmptyToken(path.display().to_string()));
        }
        Ok(config)
    }
}

/// `<config_dir>/vgu/config.json`, falling back to the working directory
/// when the platform reports no config dir.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}
