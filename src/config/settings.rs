//! # Configuration Settings
//!
//! Defines the application configuration, read from `SECRETWEAVE_*`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::backends::{SecretBackendType, VaultBackendConfig};
use crate::errors::{Result, SecretweaveError};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Backend the engine fetches secret maps from.
    pub backend: SecretBackendType,

    /// Prefix for kind-default secret paths
    /// (`{prefix}/{lowercased resource kind}`).
    #[validate(length(min = 1, message = "Default path prefix cannot be empty"))]
    pub default_path_prefix: String,

    /// Vault backend configuration, when a Vault address is set.
    pub vault: Option<VaultBackendConfig>,

    /// Secrets file for the file backend.
    pub secrets_file: Option<PathBuf>,

    /// Observability configuration.
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: SecretBackendType::Env,
            default_path_prefix: "secret/data".to_string(),
            vault: None,
            secrets_file: None,
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// - `SECRETWEAVE_BACKEND`: `vault` | `file` | `env` (default: `env`)
    /// - `SECRETWEAVE_DEFAULT_PATH_PREFIX`: default `secret/data`
    /// - `SECRETWEAVE_SECRETS_FILE`: enables the file backend
    /// - Vault variables: see [`VaultBackendConfig::from_env`]
    pub fn from_env() -> Result<Self> {
        let backend = match std::env::var("SECRETWEAVE_BACKEND") {
            Ok(raw) => raw.parse::<SecretBackendType>().map_err(SecretweaveError::config)?,
            Err(_) => SecretBackendType::Env,
        };

        let default_path_prefix = std::env::var("SECRETWEAVE_DEFAULT_PATH_PREFIX")
            .unwrap_or_else(|_| "secret/data".to_string());

        let secrets_file = std::env::var("SECRETWEAVE_SECRETS_FILE").ok().map(PathBuf::from);

        let config = Self {
            backend,
            default_path_prefix,
            vault: VaultBackendConfig::from_env()?,
            secrets_file,
            observability: ObservabilityConfig::from_env(),
        };
        config.validate_all()?;
        Ok(config)
    }

    /// Validate the entire configuration.
    pub fn validate_all(&self) -> Result<()> {
        Validate::validate(self)?;
        self.validate_custom()
    }

    /// Custom validation beyond what the validator derive covers.
    fn validate_custom(&self) -> Result<()> {
        match self.backend {
            SecretBackendType::Vault if self.vault.is_none() => {
                return Err(SecretweaveError::config(
                    "backend 'vault' selected but no Vault address configured \
                     (set SECRETWEAVE_VAULT_ADDR)",
                ));
            }
            SecretBackendType::File if self.secrets_file.is_none() => {
                return Err(SecretweaveError::config(
                    "backend 'file' selected but SECRETWEAVE_SECRETS_FILE is not set",
                ));
            }
            _ => {}
        }

        if let Some(ref vault) = self.vault {
            if !vault.address.starts_with("http://") && !vault.address.starts_with("https://") {
                return Err(SecretweaveError::config(
                    "Vault address must start with 'http://' or 'https://'",
                ));
            }
        }

        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable output.
    pub json_logs: bool,

    /// Service name attached to log output.
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            service_name: "secretweave".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Load from `SECRETWEAVE_LOG_LEVEL` and `SECRETWEAVE_LOG_FORMAT`
    /// (`json` or `text`).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: std::env::var("SECRETWEAVE_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: std::env::var("SECRETWEAVE_LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.json_logs),
            service_name: defaults.service_name,
        }
    }
}
