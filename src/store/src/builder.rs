//! Secret store builder

use crate::composite::{CompositeSecretProvider, CriticalError};
use crate::error::Result;
use crate::provider::{CachedSecretProvider, SecretProvider};
use crate::source::{ResolvedSource, SecretStoreSource};
use crate::services::Services;
use std::sync::Arc;
use tracing::{debug, info};

/// Collects secret sources in registration order
///
/// Lookups on the built [`CompositeSecretProvider`] try the sources in the
/// order they were added.
#[derive(Debug, Default)]
pub struct SecretStoreBuilder {
    sources: Vec<SecretStoreSource>,
    critical_errors: Vec<CriticalError>,
}

impl SecretStoreBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plain provider
    pub fn add_provider<P: SecretProvider + 'static>(&mut self, provider: P) -> &mut Self {
        self.add_source(SecretStoreSource::plain(provider))
    }

    /// Register a cache-aware provider
    pub fn add_cached_provider<P: CachedSecretProvider + 'static>(&mut self, provider: P) -> &mut Self {
        self.add_source(SecretStoreSource::cached(provider))
    }

    /// Register a provider built from the application's services at build time
    pub fn add_deferred<F>(&mut self, factory: F) -> &mut Self
    where
        F: Fn(&Services) -> Result<ResolvedSource> + Send + Sync + 'static,
    {
        self.add_source(SecretStoreSource::deferred(factory))
    }

    /// Register a source
    pub fn add_source(&mut self, source: SecretStoreSource) -> &mut Self {
        debug!("Registering secret source {}", source.id());
        self.sources.push(source);
        self
    }

    /// Registered sources, in lookup order
    pub fn sources(&self) -> &[SecretStoreSource] {
        &self.sources
    }

    /// Mutable access to the registered sources
    ///
    /// Used by extensions that rewrite registrations in place.
    pub fn sources_mut(&mut self) -> &mut Vec<SecretStoreSource> {
        &mut self.sources
    }

    /// Mark errors of type `E` as critical
    ///
    /// A critical error raised by any source stops the lookup and is returned
    /// to the caller instead of moving on to the next source. Registering the
    /// same type twice has no further effect.
    pub fn add_critical_error<E>(&mut self) -> &mut Self
    where
        E: std::error::Error + 'static,
    {
        let critical = CriticalError::of::<E>();
        if !self.critical_errors.contains(&critical) {
            debug!("Marking '{}' as a critical secret store error", critical.name());
            self.critical_errors.push(critical);
        }
        self
    }

    /// Whether errors of type `E` have been marked critical
    pub fn is_critical_error<E>(&self) -> bool
    where
        E: std::error::Error + 'static,
    {
        self.critical_errors.contains(&CriticalError::of::<E>())
    }

    /// Resolve every source and build the composite provider
    ///
    /// Deferred sources run their factory once per call.
    pub fn build(&self, services: &Services) -> Result<CompositeSecretProvider> {
        let sources = self
            .sources
            .iter()
            .map(|source| source.resolve(services))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Secret store built with {} source(s) and {} critical error type(s)",
            sources.len(),
            self.critical_errors.len()
        );

        Ok(CompositeSecretProvider::new(sources, self.critical_errors.clone()))
    }

    /// Build and share the composite provider
    pub fn build_shared(&self, services: &Services) -> Result<Arc<CompositeSecretProvider>> {
        self.build(services).map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachingSecretProvider;
    use crate::error::SecretStoreError;
    use crate::memory::InMemorySecretProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, thiserror::Error)]
    #[error("locked")]
    struct Locked;

    #[test]
    fn test_registration_order() {
        let mut builder = SecretStoreBuilder::new();
        builder
            .add_provider(InMemorySecretProvider::new())
            .add_cached_provider(CachingSecretProvider::new(InMemorySecretProvider::new()));

        assert_eq!(builder.sources().len(), 2);
        assert_ne!(builder.sources()[0].id(), builder.sources()[1].id());
    }

    #[test]
    fn test_critical_errors_are_deduplicated() {
        let mut builder = SecretStoreBuilder::new();
        builder.add_critical_error::<Locked>().add_critical_error::<Locked>();
        assert!(builder.is_critical_error::<Locked>());

        let store = builder.build(&Services::new()).unwrap();
        assert_eq!(store.critical_error_count(), 1);
    }

    #[test]
    fn test_deferred_factory_runs_once_per_build() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut builder = SecretStoreBuilder::new();
        builder.add_deferred(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ResolvedSource::Plain(Arc::new(InMemorySecretProvider::new())))
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        builder.build(&Services::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        builder.build(&Services::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_build_fails_when_factory_fails() {
        let mut builder = SecretStoreBuilder::new();
        builder.add_deferred(|services| {
            services
                .get_required::<InMemorySecretProvider>()
                .map(|p| ResolvedSource::Plain(p as Arc<dyn SecretProvider>))
        });

        let err = builder.build(&Services::new()).unwrap_err();
        assert!(matches!(err, SecretStoreError::Resolution(_)));
    }
}
