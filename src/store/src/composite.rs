//! Composite provider chaining registered sources

use crate::error::{ensure_name, Result, SecretStoreError};
use crate::provider::SecretProvider;
use crate::secret::Secret;
use crate::source::ResolvedSource;
use async_trait::async_trait;
use std::any::{type_name, TypeId};
use std::fmt;
use std::future::Future;
use tracing::{debug, warn};

/// An error type that aborts a composite lookup
#[derive(Clone, Copy)]
pub struct CriticalError {
    type_id: TypeId,
    name: &'static str,
    matches: fn(&SecretStoreError) -> bool,
}

impl CriticalError {
    pub(crate) fn of<E: std::error::Error + 'static>() -> Self {
        fn matches<E: std::error::Error + 'static>(err: &SecretStoreError) -> bool {
            err.downcast_ref::<E>().is_some()
        }

        Self {
            type_id: TypeId::of::<E>(),
            name: type_name::<E>(),
            matches: matches::<E>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, err: &SecretStoreError) -> bool {
        (self.matches)(err)
    }
}

impl PartialEq for CriticalError {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for CriticalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CriticalError").field(&self.name).finish()
    }
}

/// Looks secrets up across sources in registration order
///
/// - `NotFound` and ordinary failures move on to the next source
/// - a critical error stops the lookup and is returned unchanged
/// - if no source has the secret the lookup fails with `NotFound`
pub struct CompositeSecretProvider {
    sources: Vec<ResolvedSource>,
    critical_errors: Vec<CriticalError>,
}

impl CompositeSecretProvider {
    pub(crate) fn new(sources: Vec<ResolvedSource>, critical_errors: Vec<CriticalError>) -> Self {
        Self {
            sources,
            critical_errors,
        }
    }

    /// Resolved sources, in lookup order
    pub fn sources(&self) -> &[ResolvedSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn critical_error_count(&self) -> usize {
        self.critical_errors.len()
    }

    /// Whether `err` aborts a lookup
    pub fn is_critical(&self, err: &SecretStoreError) -> bool {
        self.critical_errors.iter().any(|critical| critical.matches(err))
    }

    /// Retrieve a secret, letting cache-aware sources skip their cache
    pub async fn get_cached_secret(&self, name: &str, ignore_cache: bool) -> Result<Secret> {
        self.first_match(name, |source| async move {
            match source {
                ResolvedSource::Cached(provider) => provider.get_cached_secret(name, ignore_cache).await,
                ResolvedSource::Plain(provider) => provider.get_secret(name).await,
            }
        })
        .await
    }

    /// Retrieve a secret value, letting cache-aware sources skip their cache
    pub async fn get_cached_raw_secret(&self, name: &str, ignore_cache: bool) -> Result<String> {
        self.first_match(name, |source| async move {
            match source {
                ResolvedSource::Cached(provider) => provider.get_cached_raw_secret(name, ignore_cache).await,
                ResolvedSource::Plain(provider) => provider.get_raw_secret(name).await,
            }
        })
        .await
    }

    /// Drop `name` from every cache-aware source
    ///
    /// Stops at the first failing source.
    pub async fn invalidate_secret(&self, name: &str) -> Result<()> {
        ensure_name(name)?;
        for provider in self.sources.iter().filter_map(ResolvedSource::as_cached) {
            provider.invalidate_secret(name).await?;
        }
        Ok(())
    }

    async fn first_match<'a, T, F, Fut>(&'a self, name: &str, lookup: F) -> Result<T>
    where
        F: Fn(&'a ResolvedSource) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        ensure_name(name)?;

        for (index, source) in self.sources.iter().enumerate() {
            match lookup(source).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_not_found() => {
                    debug!("Secret '{}' not found in source #{}", name, index);
                }
                Err(err) if self.is_critical(&err) => {
                    warn!("Source #{} raised a critical error for secret '{}': {}", index, name, err);
                    return Err(err);
                }
                Err(err) => {
                    warn!("Source #{} failed to provide secret '{}': {}", index, name, err);
                }
            }
        }

        Err(SecretStoreError::not_found(name))
    }
}

#[async_trait]
impl SecretProvider for CompositeSecretProvider {
    async fn get_secret(&self, name: &str) -> Result<Secret> {
        self.first_match(name, |source| source.get_secret(name)).await
    }

    async fn get_raw_secret(&self, name: &str) -> Result<String> {
        self.first_match(name, |source| source.get_raw_secret(name)).await
    }
}

impl fmt::Debug for CompositeSecretProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeSecretProvider")
            .field("sources", &self.sources)
            .field("critical_errors", &self.critical_errors)
            .finish()
    }
}
