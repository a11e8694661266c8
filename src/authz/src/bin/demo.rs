//! # Warden Demo
//!
//! Builds a secret store with one public and one role-restricted source and
//! looks a secret up as the configured role.
//!
//! ```text
//! warden-demo --role reader app-name      # warden
//! warden-demo --role reader db-password   # denied
//! warden-demo --role admin db-password    # s3cr3t
//! ```
//!
//! Environment variables:
//! - `WARDEN_CONFIG` - Path to a TOML configuration file
//! - `RUST_LOG` - Log level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use warden_authz::{
    AuthorizationConfig, AuthorizedSecretStoreBuilderExt, IntoRole, RoleAuthorization,
    SecretStoreErrorExt,
};
use warden_store::{
    CachingSecretProvider, InMemorySecretProvider, SecretProvider, SecretStoreBuilder, Services,
};

/// Warden role-restricted secret lookup
#[derive(Parser)]
#[command(name = "warden-demo")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "WARDEN_CONFIG")]
    config: Option<PathBuf>,

    /// Current role (overrides config)
    #[arg(short, long)]
    role: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Name of the secret to look up
    secret: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},warden_store={}", log_level, log_level).into()),
        )
        .with_target(true)
        .init();

    let mut config = match &cli.config {
        Some(path) => AuthorizationConfig::load(path)?,
        None => AuthorizationConfig::new(warden_authz::Role::Reader),
    };
    if let Some(role) = cli.role {
        config.authorization.current_role = role.into_role().context("Invalid --role")?;
    }
    config.validate()?;

    info!(
        "Looking up '{}' as role '{}'",
        cli.secret, config.authorization.current_role
    );

    let restricted = CachingSecretProvider::with_config(
        InMemorySecretProvider::from_secrets([("db-password", "s3cr3t"), ("api-key", "k-123")])?,
        config.cache.clone(),
    );

    let mut builder = SecretStoreBuilder::new();
    builder
        .add_provider(InMemorySecretProvider::with_secret("app-name", "warden"))
        .authorized_within(config.authorization.required_role, |stores| {
            stores.add_cached_provider(restricted);
        })?;

    let authorization: Arc<dyn RoleAuthorization> = config.authorization().shared();
    let services = Services::new().with(authorization);
    let store = builder.build(&services)?;

    match store.get_raw_secret(&cli.secret).await {
        Ok(value) => {
            println!("{}", value);
            Ok(())
        }
        Err(err) if err.is_authorization_denied() => {
            error!("{}", err);
            anyhow::bail!("Access to '{}' denied", cli.secret)
        }
        Err(err) => Err(err.into()),
    }
}
