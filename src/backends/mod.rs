//! # Secret Backends
//!
//! Adapters for external secret stores. Every adapter implements the one
//! [`SecretBackend`] contract the substitution engine consumes: `login`,
//! `get_secrets`, and `get_individual_secret`, with the same signature
//! regardless of what the store itself can address. Backends are read-only
//! to the engine.
//!
//! Shipped adapters:
//! - [`VaultSecretBackend`]: HashiCorp Vault KV v1/v2 (production)
//! - [`FileSecretBackend`]: local YAML file (development, CI)
//! - [`EnvSecretBackend`]: environment variables (development)

pub mod backend;
pub mod env;
pub mod file;
pub mod registry;
pub mod vault;

pub use backend::{BackendAnnotations, SecretBackend, SecretBackendType};
pub use env::EnvSecretBackend;
pub use file::FileSecretBackend;
pub use registry::SecretBackendRegistry;
pub use vault::{VaultAuth, VaultBackendConfig, VaultSecretBackend};
