//! # secretweave
//!
//! Secretweave injects externally-resolved secret values into structured
//! configuration documents (Kubernetes manifests) ahead of deployment,
//! replacing `<...>` placeholders with values fetched from a configurable
//! secret store.
//!
//! ## Architecture
//!
//! ```text
//! Manifest stream → Resource Policy → Backend fetch → Substitution Engine
//!                        ↓                 ↓                 ↓
//!                  Annotations      SecretBackend      Modifier Registry
//! ```
//!
//! ## Core Components
//!
//! - **Template core** ([`template`]): placeholder parser, modifier
//!   registry, tree substitution engine, resource policy, and the
//!   per-resource lifecycle wrapper
//! - **Secret backends** ([`backends`]): adapters implementing the uniform
//!   fetch contract (HashiCorp Vault, local file, environment variables)
//! - **Configuration** ([`config`]): `SECRETWEAVE_*` environment settings
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use secretweave::backends::SecretBackendRegistry;
//! use secretweave::template::{Resource, ResourcePolicy};
//! use secretweave::{AppConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let registry = SecretBackendRegistry::from_config(&config).await?;
//!     let backend = registry.primary();
//!
//!     let policy = ResourcePolicy::new(&config.default_path_prefix);
//!     let mut resource = Resource::from_yaml("kind: Secret\ndata:\n  pw: \"<pw>\"\n")?;
//!     if resource.scan(&policy)? {
//!         backend.login().await?;
//!         resource.fetch_secrets(backend.as_ref()).await?;
//!         resource.replace()?;
//!     }
//!     println!("{}", resource.serialize()?);
//!     Ok(())
//! }
//! ```

pub mod backends;
pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod secrecy;
pub mod template;

// Re-export commonly used types and traits
pub use backends::{SecretBackend, SecretBackendRegistry, SecretBackendType};
pub use config::AppConfig;
pub use errors::{Result, SecretweaveError};
pub use secrecy::SecretString;
pub use template::{Resource, ResourcePolicy, SecretMap, TreeValue};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
