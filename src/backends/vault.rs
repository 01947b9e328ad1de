//! HashiCorp Vault secret backend.
//!
//! Fetches secret maps from Vault's KV engines by path reference. The KV
//! flavor is chosen per resource via the `secretweave.io/kv-version`
//! annotation (v2 by default); a `secretweave.io/secret-version` pin maps to
//! a KV v2 versioned read and is ignored for KV v1.
//!
//! # Path format
//!
//! Paths are `mount/rest-of-path`, e.g. `secret/team-a/app` reads
//! `team-a/app` from the `secret` mount. For KV v2 a second segment `data/`
//! is tolerated and stripped, so paths copied from Vault's HTTP API or UI
//! (`secret/data/team-a/app`) work unchanged.
//!
//! # Authentication
//!
//! Token and AppRole auth are supported. AppRole exchanges credentials for
//! a client token when the backend is constructed; [`SecretBackend::login`]
//! then validates the session against the server and is safe to call
//! repeatedly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use vaultrs::client::{Client as _, VaultClient, VaultClientSettingsBuilder};
use vaultrs::{kv1, kv2};

use crate::errors::{Result, SecretweaveError};
use crate::secrecy::SecretString;
use crate::template::policy::ANNOTATION_KV_VERSION;
use crate::template::value::SecretMap;

use super::backend::{BackendAnnotations, SecretBackend, SecretBackendType};

/// How the Vault client authenticates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum VaultAuth {
    /// Static client token.
    Token { token: SecretString },
    /// AppRole role/secret exchange against an auth mount.
    AppRole { mount: String, role_id: String, secret_id: SecretString },
}

/// Configuration for the Vault backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultBackendConfig {
    /// Vault server address.
    pub address: String,
    /// Authentication method.
    pub auth: VaultAuth,
    /// Vault namespace (Enterprise).
    pub namespace: Option<String>,
}

impl VaultBackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Uses:
    /// - `SECRETWEAVE_VAULT_ADDR` or `VAULT_ADDR` (required to enable Vault)
    /// - `SECRETWEAVE_VAULT_TOKEN` or `VAULT_TOKEN`
    /// - `SECRETWEAVE_VAULT_APPROLE_ROLE_ID` / `SECRETWEAVE_VAULT_APPROLE_SECRET_ID`
    ///   (used when no token is set; mount from
    ///   `SECRETWEAVE_VAULT_APPROLE_MOUNT`, default `approle`)
    /// - `SECRETWEAVE_VAULT_NAMESPACE` or `VAULT_NAMESPACE`
    ///
    /// Returns `None` when no address is configured.
    pub fn from_env() -> Result<Option<Self>> {
        let address = std::env::var("SECRETWEAVE_VAULT_ADDR")
            .or_else(|_| std::env::var("VAULT_ADDR"))
            .ok();
        let Some(address) = address else {
            return Ok(None);
        };

        let token = std::env::var("SECRETWEAVE_VAULT_TOKEN")
            .or_else(|_| std::env::var("VAULT_TOKEN"))
            .ok();

        let auth = match token {
            Some(token) => VaultAuth::Token { token: token.into() },
            None => {
                let role_id = std::env::var("SECRETWEAVE_VAULT_APPROLE_ROLE_ID").map_err(|_| {
                    SecretweaveError::config(
                        "Vault auth requires SECRETWEAVE_VAULT_TOKEN or \
                         SECRETWEAVE_VAULT_APPROLE_ROLE_ID",
                    )
                })?;
                let secret_id =
                    std::env::var("SECRETWEAVE_VAULT_APPROLE_SECRET_ID").map_err(|_| {
                        SecretweaveError::config(
                            "AppRole auth requires SECRETWEAVE_VAULT_APPROLE_SECRET_ID",
                        )
                    })?;
                let mount = std::env::var("SECRETWEAVE_VAULT_APPROLE_MOUNT")
                    .unwrap_or_else(|_| "approle".to_string());
                VaultAuth::AppRole { mount, role_id, secret_id: secret_id.into() }
            }
        };

        let namespace = std::env::var("SECRETWEAVE_VAULT_NAMESPACE")
            .or_else(|_| std::env::var("VAULT_NAMESPACE"))
            .ok();

        Ok(Some(Self { address, auth, namespace }))
    }
}

/// HashiCorp Vault secret backend.
pub struct VaultSecretBackend {
    client: VaultClient,
}

impl std::fmt::Debug for VaultSecretBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSecretBackend").field("client", &"[VaultClient]").finish()
    }
}

impl VaultSecretBackend {
    /// Create a new Vault backend, performing the AppRole exchange if that
    /// auth method is configured.
    pub async fn new(config: VaultBackendConfig) -> Result<Self> {
        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&config.address);

        if let VaultAuth::Token { ref token } = config.auth {
            settings_builder.token(token.expose_secret());
        }

        if let Some(ref namespace) = config.namespace {
            settings_builder.namespace(Some(namespace.clone()));
        }

        let settings = settings_builder.build().map_err(|e| {
            SecretweaveError::config(format!("invalid Vault configuration: {}", e))
        })?;

        let mut client = VaultClient::new(settings)
            .map_err(|e| SecretweaveError::config(format!("failed to create Vault client: {}", e)))?;

        if let VaultAuth::AppRole { ref mount, ref role_id, ref secret_id } = config.auth {
            let auth = vaultrs::auth::approle::login(
                &client,
                mount,
                role_id,
                secret_id.expose_secret(),
            )
            .await
            .map_err(|e| SecretweaveError::auth(format!("AppRole login failed: {}", e)))?;
            client.set_token(&auth.client_token);
        }

        info!(address = %config.address, "Initialized Vault secret backend");
        Ok(Self { client })
    }

    /// Create backend from environment configuration.
    pub async fn from_env() -> Result<Option<Self>> {
        match VaultBackendConfig::from_env()? {
            Some(config) => Ok(Some(Self::new(config).await?)),
            None => Ok(None),
        }
    }

    /// Splits a secret path into `(mount, path-in-mount)`.
    fn split_mount(path: &str) -> Result<(&str, &str)> {
        match path.split_once('/') {
            Some((mount, rest)) if !mount.is_empty() && !rest.is_empty() => Ok((mount, rest)),
            _ => Err(SecretweaveError::backend(format!(
                "Vault path '{}' must be of the form mount/path",
                path
            ))),
        }
    }

    fn parse_version(version: Option<&str>) -> Result<Option<u64>> {
        version
            .map(|v| {
                v.parse::<u64>().map_err(|_| {
                    SecretweaveError::backend(format!("invalid secret version '{}'", v))
                })
            })
            .transpose()
    }
}

#[async_trait]
impl SecretBackend for VaultSecretBackend {
    async fn login(&self) -> Result<()> {
        vaultrs::sys::health(&self.client)
            .await
            .map_err(|e| SecretweaveError::auth(format!("Vault session validation failed: {}", e)))?;
        Ok(())
    }

    async fn get_secrets(
        &self,
        path: &str,
        version: Option<&str>,
        annotations: &BackendAnnotations,
    ) -> Result<SecretMap> {
        let (mount, secret_path) = Self::split_mount(path)?;
        let kv1_selected =
            annotations.get(ANNOTATION_KV_VERSION).map(String::as_str) == Some("1");

        debug!(path = %path, kv1 = kv1_selected, version = ?version, "Fetching secrets from Vault");

        let secrets: SecretMap = if kv1_selected {
            if version.is_some() {
                debug!(path = %path, "KV v1 engine ignores secret version pin");
            }
            kv1::get(&self.client, mount, secret_path).await.map_err(|e| {
                error!(path = %path, error = %e, "Failed to fetch secrets from Vault KV v1");
                SecretweaveError::path_not_found(path, e.to_string())
            })?
        } else {
            // Tolerate the data/ segment of KV v2 HTTP API paths.
            let secret_path = secret_path.strip_prefix("data/").unwrap_or(secret_path);
            match Self::parse_version(version)? {
                Some(v) => {
                    kv2::read_version(&self.client, mount, secret_path, v).await.map_err(|e| {
                        error!(path = %path, version = v, error = %e, "Failed to fetch secret version from Vault");
                        SecretweaveError::path_not_found(path, e.to_string())
                    })?
                }
                None => kv2::read(&self.client, mount, secret_path).await.map_err(|e| {
                    error!(path = %path, error = %e, "Failed to fetch secrets from Vault KV v2");
                    SecretweaveError::path_not_found(path, e.to_string())
                })?,
            }
        };

        if secrets.is_empty() {
            return Err(SecretweaveError::path_not_found(path, "path holds no keys"));
        }
        Ok(secrets)
    }

    fn backend_type(&self) -> SecretBackendType {
        SecretBackendType::Vault
    }
}
