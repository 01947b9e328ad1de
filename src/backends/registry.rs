//! Secret backend registry.
//!
//! Builds the backends named by the application configuration and hands the
//! engine an `Arc<dyn SecretBackend>` shared across all resources in a run.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::{Result, SecretweaveError};

use super::backend::{SecretBackend, SecretBackendType};
use super::env::EnvSecretBackend;
use super::file::FileSecretBackend;
use super::vault::VaultSecretBackend;

/// Registry of constructed secret backends.
pub struct SecretBackendRegistry {
    backends: HashMap<SecretBackendType, Arc<dyn SecretBackend>>,
    primary: SecretBackendType,
}

impl std::fmt::Debug for SecretBackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBackendRegistry")
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .field("primary", &self.primary)
            .finish()
    }
}

impl SecretBackendRegistry {
    /// Construct every backend the configuration describes.
    ///
    /// The environment backend is always available; Vault and file backends
    /// are built when configured. The configured primary backend must end up
    /// registered or construction fails.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let mut backends: HashMap<SecretBackendType, Arc<dyn SecretBackend>> = HashMap::new();

        backends.insert(SecretBackendType::Env, Arc::new(EnvSecretBackend::new()));

        if let Some(ref vault_config) = config.vault {
            let vault = VaultSecretBackend::new(vault_config.clone()).await?;
            backends.insert(SecretBackendType::Vault, Arc::new(vault));
        }

        if let Some(ref path) = config.secrets_file {
            backends.insert(SecretBackendType::File, Arc::new(FileSecretBackend::new(path)?));
        }

        if !backends.contains_key(&config.backend) {
            return Err(SecretweaveError::config(format!(
                "backend '{}' selected but not configured",
                config.backend
            )));
        }

        info!(
            primary = %config.backend,
            registered = backends.len(),
            "Initialized secret backends"
        );
        Ok(Self { backends, primary: config.backend })
    }

    /// The backend selected by configuration.
    pub fn primary(&self) -> Arc<dyn SecretBackend> {
        self.backends
            .get(&self.primary)
            .cloned()
            .expect("primary backend presence is checked at construction")
    }

    /// A specific backend, if registered.
    pub fn get(&self, backend_type: SecretBackendType) -> Option<Arc<dyn SecretBackend>> {
        self.backends.get(&backend_type).cloned()
    }

    pub fn has_backend(&self, backend_type: SecretBackendType) -> bool {
        self.backends.contains_key(&backend_type)
    }

    /// Registered backend types, sorted by name for stable output.
    pub fn registered_backends(&self) -> Vec<SecretBackendType> {
        let mut types: Vec<_> = self.backends.keys().copied().collect();
        types.sort_by_key(|t| t.as_str());
        types
    }
}
