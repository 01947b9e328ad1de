//! Local file secret backend.
//!
//! Reads a single YAML document mapping secret paths to key/value maps.
//! Intended for offline development and CI pipelines where a real secret
//! store is unavailable:
//!
//! ```yaml
//! secret/data/deployment:
//!   db-password: hunter2
//!   replicas: 3
//! team-a/app:
//!   api-key: abc123
//! ```
//!
//! Values keep their YAML types, so this backend supports typed
//! substitution. The `version` parameter is ignored; the file is the only
//! revision there is.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{Result, SecretweaveError};
use crate::template::value::SecretMap;

use super::backend::{BackendAnnotations, SecretBackend, SecretBackendType};

/// Local YAML file secret backend.
pub struct FileSecretBackend {
    source: PathBuf,
    documents: BTreeMap<String, SecretMap>,
}

impl std::fmt::Debug for FileSecretBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSecretBackend")
            .field("source", &self.source)
            .field("paths", &self.documents.len())
            .finish()
    }
}

impl FileSecretBackend {
    /// Loads and parses the secrets file eagerly so configuration errors
    /// surface at startup, not mid-substitution.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let source = path.as_ref().to_path_buf();
        let raw = std::fs::read_to_string(&source)?;
        let documents: BTreeMap<String, SecretMap> = serde_yaml::from_str(&raw).map_err(|e| {
            SecretweaveError::config(format!(
                "secrets file {} is not a path-to-map document: {}",
                source.display(),
                e
            ))
        })?;

        info!(file = %source.display(), paths = documents.len(), "Loaded file secret backend");
        Ok(Self { source, documents })
    }
}

#[async_trait]
impl SecretBackend for FileSecretBackend {
    async fn login(&self) -> Result<()> {
        Ok(())
    }

    async fn get_secrets(
        &self,
        path: &str,
        version: Option<&str>,
        _annotations: &BackendAnnotations,
    ) -> Result<SecretMap> {
        if version.is_some() {
            debug!(path = %path, "file backend ignores secret version pin");
        }

        let secrets = self.documents.get(path).ok_or_else(|| {
            SecretweaveError::path_not_found(
                path,
                format!("not present in {}", self.source.display()),
            )
        })?;

        if secrets.is_empty() {
            return Err(SecretweaveError::path_not_found(path, "path holds no keys"));
        }
        Ok(secrets.clone())
    }

    fn backend_type(&self) -> SecretBackendType {
        SecretBackendType::File
    }
}
