//! # Command Line Interface
//!
//! Thin adapter around the substitution core: reads a multi-document YAML
//! stream, runs each document through policy evaluation, secret fetch, and
//! substitution, and writes the substituted stream to stdout. No
//! substitution logic lives here.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::io::Read;
use std::process;
use tracing::{error, info};

use crate::backends::{SecretBackend, SecretBackendRegistry, SecretBackendType};
use crate::config::AppConfig;
use crate::observability;
use crate::template::{Resource, ResourcePolicy, TreeValue};

#[derive(Parser)]
#[command(name = "secretweave")]
#[command(about = "Inject secrets from external stores into Kubernetes manifests")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Substitute placeholders in a manifest stream
    Inject {
        /// Manifest file to process, or '-' for stdin
        #[arg(default_value = "-")]
        input: String,

        /// Override the configured backend (vault, file, env)
        #[arg(long)]
        backend: Option<SecretBackendType>,
    },

    /// List configured secret backends
    Backends,
}

/// Run CLI commands.
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    let config = AppConfig::from_env()?;
    observability::init_tracing(&config.observability)?;
    observability::log_config_info(&config);

    match cli.command {
        Commands::Inject { input, backend } => {
            let registry = SecretBackendRegistry::from_config(&config).await?;
            let backend = match backend {
                Some(requested) => registry.get(requested).ok_or_else(|| {
                    anyhow::anyhow!("backend '{}' is not configured", requested)
                })?,
                None => registry.primary(),
            };

            let manifests = read_input(&input)?;
            let failures = inject(&config, backend.as_ref(), &manifests).await?;
            if failures > 0 {
                error!(failures, "one or more resources failed substitution");
                process::exit(1);
            }
        }

        Commands::Backends => {
            let registry = SecretBackendRegistry::from_config(&config).await?;
            for backend_type in registry.registered_backends() {
                let marker = if backend_type == config.backend { " (primary)" } else { "" };
                println!("{}{}", backend_type, marker);
            }
        }
    }

    Ok(())
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

/// Processes every document in the stream, printing substituted documents
/// to stdout. Returns the number of failed resources; failures are reported
/// per resource and do not block the rest of the batch.
async fn inject(
    config: &AppConfig,
    backend: &dyn SecretBackend,
    manifests: &str,
) -> anyhow::Result<usize> {
    let policy = ResourcePolicy::new(&config.default_path_prefix);
    let mut failures = 0usize;
    let mut logged_in = false;
    let mut first = true;

    for document in serde_yaml::Deserializer::from_str(manifests) {
        let tree = match TreeValue::deserialize(document) {
            Ok(tree) => tree,
            Err(e) => {
                error!(error = %e, "skipping unparseable document");
                failures += 1;
                continue;
            }
        };

        let mut resource = Resource::new(tree);
        let rendered = match process_resource(&mut resource, &policy, backend, &mut logged_in).await
        {
            Ok(rendered) => rendered,
            Err(e) => {
                error!(resource = %resource.display_name(), error = %e, "substitution failed");
                failures += 1;
                continue;
            }
        };

        if !first {
            println!("---");
        }
        first = false;
        print!("{}", rendered);
    }

    Ok(failures)
}

async fn process_resource(
    resource: &mut Resource,
    policy: &ResourcePolicy,
    backend: &dyn SecretBackend,
    logged_in: &mut bool,
) -> crate::errors::Result<String> {
    let replaceable = resource.scan(policy)?;
    if !replaceable {
        info!(resource = %resource.display_name(), "no placeholders, passing through");
        return resource.serialize();
    }

    // Authenticate lazily so a batch of ignored resources never touches the
    // backend.
    if !*logged_in {
        backend.login().await?;
        *logged_in = true;
    }

    resource.fetch_secrets(backend).await?;
    resource.replace()?;
    resource.serialize()
}
