//! Secret provider traits

use crate::cache::CacheConfig;
use crate::error::Result;
use crate::secret::Secret;
use async_trait::async_trait;

/// Retrieves secrets by name
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Retrieve the secret stored under `name`
    ///
    /// Returns `SecretStoreError::NotFound` when this provider does not hold it.
    async fn get_secret(&self, name: &str) -> Result<Secret>;

    /// Retrieve only the value of the secret stored under `name`
    async fn get_raw_secret(&self, name: &str) -> Result<String> {
        Ok(self.get_secret(name).await?.value)
    }
}

/// A secret provider that keeps retrieved secrets in a cache
#[async_trait]
pub trait CachedSecretProvider: SecretProvider {
    /// Cache settings used by this provider
    fn configuration(&self) -> &CacheConfig;

    /// Retrieve a secret, skipping the cache when `ignore_cache` is set
    async fn get_cached_secret(&self, name: &str, ignore_cache: bool) -> Result<Secret>;

    /// Retrieve a secret value, skipping the cache when `ignore_cache` is set
    async fn get_cached_raw_secret(&self, name: &str, ignore_cache: bool) -> Result<String> {
        Ok(self.get_cached_secret(name, ignore_cache).await?.value)
    }

    /// Drop `name` from the cache so the next lookup reaches the backend
    async fn invalidate_secret(&self, name: &str) -> Result<()>;
}
