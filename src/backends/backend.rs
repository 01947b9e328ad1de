//! Secret backend trait and types.
//!
//! Defines the uniform fetch contract every secret-store adapter implements.
//! The substitution engine only ever consumes this trait; it never writes
//! secrets and never interprets version strings beyond passing them through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::Result;
use crate::template::value::{SecretMap, TreeValue};

/// Resource annotations forwarded verbatim to backend calls so adapters can
/// honor backend-specific hints (e.g. the KV engine version).
pub type BackendAnnotations = BTreeMap<String, String>;

/// Type of secret backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretBackendType {
    /// HashiCorp Vault KV v1/v2
    Vault,
    /// Environment variables (development only)
    Env,
    /// Local YAML file (development and CI)
    File,
}

impl SecretBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vault => "vault",
            Self::Env => "env",
            Self::File => "file",
        }
    }
}

impl FromStr for SecretBackendType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "vault" => Ok(Self::Vault),
            "env" => Ok(Self::Env),
            "file" => Ok(Self::File),
            _ => Err(format!("Unknown secret backend type: {}", s)),
        }
    }
}

impl fmt::Display for SecretBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for secret backends.
///
/// Implementations must be Send + Sync for use in async contexts, and are
/// read-only to the engine.
#[async_trait]
pub trait SecretBackend: Send + Sync + fmt::Debug {
    /// Establish or validate an authenticated session. Idempotent; may be a
    /// no-op for backends whose SDK handles auth internally.
    async fn login(&self) -> Result<()>;

    /// Fetch the full key/value set available at `path`.
    ///
    /// `version` is a backend-specific revision pin and may be ignored.
    /// Must fail with a descriptive error when the path does not exist or
    /// holds no keys; it never returns an empty map.
    async fn get_secrets(
        &self,
        path: &str,
        version: Option<&str>,
        annotations: &BackendAnnotations,
    ) -> Result<SecretMap>;

    /// Fetch a single key from `path`.
    ///
    /// The default implementation fetches the whole set and projects the
    /// key, returning `None` (not an error) when the key is absent; the
    /// "missing" decision belongs to the caller.
    async fn get_individual_secret(
        &self,
        path: &str,
        key: &str,
        version: Option<&str>,
        annotations: &BackendAnnotations,
    ) -> Result<Option<TreeValue>> {
        let secrets = self.get_secrets(path, version, annotations).await?;
        Ok(secrets.get(key).cloned())
    }

    /// Get the backend type identifier.
    fn backend_type(&self) -> SecretBackendType;
}
