//! Configuration and credential loading.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ConfigError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub promotions: Option<PromoConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// File holding the OAuth 2.0 user-context bearer token.
    pub bearer_token_file: String,
}

impl ApiConfig {
    pub fn expand_token_file_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.bearer_token_file).to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Seconds to wait between the posts of a thread.
    pub delay_seconds: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { delay_seconds: 2.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoConfig {
    pub path: String,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// An absent config file yields the defaults; the tools are expected to
    /// work with nothing but an `X_BEARER_TOKEN` in the environment.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Path of the promotions file, tilde-expanded; defaults to
    /// `promotions.json` in the working directory.
    pub fn promotions_path(&self) -> PathBuf {
        match &self.promotions {
            Some(promo) => PathBuf::from(shellexpand::tilde(&promo.path).to_string()),
            None => PathBuf::from("promotions.json"),
        }
    }
}

/// Resolve the configuration file path following the XDG base directory spec.
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("HILO_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("hilo").join("config.toml"))
}

/// Credentials for the platform API.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub bearer_token: String,
}

impl ApiCredentials {
    /// Resolve the bearer token: the `X_BEARER_TOKEN` environment variable
    /// wins, then the token file named by the config.
    pub fn resolve(config: &Config) -> Result<Self> {
        if let Ok(token) = std::env::var("X_BEARER_TOKEN") {
            let token = token.trim().to_string();
            if !token.is_empty() {
                return Ok(Self {
                    bearer_token: token,
                });
            }
        }

        let api = config
            .api
            .as_ref()
            .ok_or_else(|| ConfigError::MissingField("api.bearer_token_file".to_string()))?;
        let token_path = api.expand_token_file_path();

        if !token_path.exists() {
            return Err(ApiError::Authentication(format!(
                "bearer token file not found: {}. Create this file with your OAuth 2.0 \
                 user token or set X_BEARER_TOKEN in the environment.",
                token_path.display()
            ))
            .into());
        }

        let token = std::fs::read_to_string(&token_path)
            .map_err(|e| {
                ApiError::Authentication(format!(
                    "failed to read bearer token file {}: {}",
                    token_path.display(),
                    e
                ))
            })?
            .trim()
            .to_string();

        if token.is_empty() {
            return Err(ApiError::Authentication(format!(
                "bearer token file is empty: {}",
                token_path.display()
            ))
            .into());
        }

        Ok(Self {
            bearer_token: token,
        })
    }
}
