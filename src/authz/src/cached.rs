//! Authorized cache-aware secret provider

use crate::authorization::RoleAuthorization;
use crate::error::Result;
use crate::provider::RoleGate;
use crate::role::{IntoRole, Role};
use async_trait::async_trait;
use std::sync::Arc;
use warden_store::{ensure_name, CacheConfig, CachedSecretProvider, Secret, SecretProvider};

/// Cache-aware secret provider that only serves callers within a required role
///
/// Lookups, cache bypasses and invalidations all go through the role check.
/// The cache configuration is readable by anyone since it holds no secret
/// material.
pub struct AuthorizedCachedSecretProvider {
    gate: RoleGate,
    provider: Arc<dyn CachedSecretProvider>,
}

impl AuthorizedCachedSecretProvider {
    /// Restrict `provider` to callers that `authorization` considers within `role`
    ///
    /// Fails with `InvalidRole` for raw role values outside the defined roles.
    pub fn new(
        role: impl IntoRole,
        authorization: Arc<dyn RoleAuthorization>,
        provider: Arc<dyn CachedSecretProvider>,
    ) -> Result<Self> {
        Ok(Self {
            gate: RoleGate::new(role, authorization)?,
            provider,
        })
    }

    /// The role required to access the wrapped provider
    pub fn role(&self) -> Role {
        self.gate.role()
    }
}

#[async_trait]
impl SecretProvider for AuthorizedCachedSecretProvider {
    async fn get_secret(&self, name: &str) -> warden_store::Result<Secret> {
        ensure_name(name)?;
        self.gate.when_authorized(|| self.provider.get_secret(name)).await
    }

    async fn get_raw_secret(&self, name: &str) -> warden_store::Result<String> {
        ensure_name(name)?;
        self.gate.when_authorized(|| self.provider.get_raw_secret(name)).await
    }
}

#[async_trait]
impl CachedSecretProvider for AuthorizedCachedSecretProvider {
    fn configuration(&self) -> &CacheConfig {
        self.provider.configuration()
    }

    async fn get_cached_secret(&self, name: &str, ignore_cache: bool) -> warden_store::Result<Secret> {
        ensure_name(name)?;
        self.gate
            .when_authorized(|| self.provider.get_cached_secret(name, ignore_cache))
            .await
    }

    async fn get_cached_raw_secret(&self, name: &str, ignore_cache: bool) -> warden_store::Result<String> {
        ensure_name(name)?;
        self.gate
            .when_authorized(|| self.provider.get_cached_raw_secret(name, ignore_cache))
            .await
    }

    async fn invalidate_secret(&self, name: &str) -> warden_store::Result<()> {
        ensure_name(name)?;
        self.gate
            .when_authorized(|| self.provider.invalidate_secret(name))
            .await
    }
}
