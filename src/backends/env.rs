//! Environment variable secret backend.
//!
//! Development and testing only. Secrets are read from variables named
//! `SECRETWEAVE_SECRET_<PATH>_<KEY>`, where `<PATH>` is the secret path
//! uppercased with every non-alphanumeric character replaced by `_`:
//!
//! ```bash
//! # get_secrets("secret/app", ...) sees these as {username, password}
//! export SECRETWEAVE_SECRET_SECRET_APP_USERNAME="admin"
//! export SECRETWEAVE_SECRET_SECRET_APP_PASSWORD="hunter2"
//! ```
//!
//! Values are always text scalars; typed substitution requires a backend
//! that can represent structured values. Environment variables are visible
//! in process listings and offer no versioning, so this backend ignores the
//! `version` parameter.

use async_trait::async_trait;
use std::env;
use tracing::debug;

use crate::errors::{Result, SecretweaveError};
use crate::template::value::{SecretMap, TreeValue};

use super::backend::{BackendAnnotations, SecretBackend, SecretBackendType};

/// Environment variable prefix for secrets.
const SECRET_PREFIX: &str = "SECRETWEAVE_SECRET_";

/// Environment variable secret backend (development only).
#[derive(Debug, Clone, Default)]
pub struct EnvSecretBackend;

impl EnvSecretBackend {
    pub fn new() -> Self {
        Self
    }

    /// Converts a secret path to the environment variable prefix its keys
    /// live under.
    fn path_prefix(path: &str) -> String {
        let normalized: String = path
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("{}{}_", SECRET_PREFIX, normalized)
    }
}

#[async_trait]
impl SecretBackend for EnvSecretBackend {
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
            debug!(path = %path, "environment backend ignores secret version pin");
        }

        let prefix = Self::path_prefix(path);
        let secrets: SecretMap = env::vars()
            .filter_map(|(name, value)| {
                name.strip_prefix(&prefix)
                    .map(|key| (key.to_lowercase(), TreeValue::Text(value)))
            })
            .collect();

        if secrets.is_empty() {
            return Err(SecretweaveError::path_not_found(
                path,
                format!("no environment variables with prefix {}", prefix),
            ));
        }
        Ok(secrets)
    }

    fn backend_type(&self) -> SecretBackendType {
        SecretBackendType::Env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_prefix() {
        assert_eq!(
            EnvSecretBackend::path_prefix("secret/app"),
            "SECRETWEAVE_SECRET_SECRET_APP_"
        );
        assert_eq!(
            EnvSecretBackend::path_prefix("team-a/db.prod"),
            "SECRETWEAVE_SECRET_TEAM_A_DB_PROD_"
        );
    }

    #[tokio::test]
    async fn test_get_secrets_from_env() {
        env::set_var("SECRETWEAVE_SECRET_ENVTEST_APP_USERNAME", "admin");
        env::set_var("SECRETWEAVE_SECRET_ENVTEST_APP_PASSWORD", "hunter2");

        let backend = EnvSecretBackend::new();
        let secrets =
            backend.get_secrets("envtest/app", None, &BackendAnnotations::new()).await.unwrap();

        assert_eq!(secrets["username"], TreeValue::from("admin"));
        assert_eq!(secrets["password"], TreeValue::from("hunter2"));

        env::remove_var("SECRETWEAVE_SECRET_ENVTEST_APP_USERNAME");
        env::remove_var("SECRETWEAVE_SECRET_ENVTEST_APP_PASSWORD");
    }

    #[tokio::test]
    async fn test_missing_path_is_an_error() {
        let backend = EnvSecretBackend::new();
        let err = backend
            .get_secrets("envtest/nothing-here", None, &BackendAnnotations::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SecretweaveError::PathNotFound { .. }));
    }
}
