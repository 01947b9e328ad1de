//! # Observability
//!
//! Structured logging for secretweave using the tracing ecosystem.
//!
//! Secret values never appear in log output: backends log paths, key counts,
//! and error causes, and the engine logs field paths only.

use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;
use crate::errors::{Result, SecretweaveError};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured default filter. Safe to
/// call once per process; a second call reports a configuration error.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = if config.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    result.map_err(|e| SecretweaveError::config(format!("failed to initialize logging: {}", e)))
}

/// Log effective configuration at startup.
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        backend = %config.backend,
        default_path_prefix = %config.default_path_prefix,
        vault_configured = config.vault.is_some(),
        secrets_file = ?config.secrets_file,
        "secretweave configuration"
    );
}
