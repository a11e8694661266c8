//! Secret store sources: the registration units held by the builder

use crate::error::Result;
use crate::provider::{CachedSecretProvider, SecretProvider};
use crate::secret::Secret;
use crate::services::Services;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Identity of a registered source
///
/// Assigned once when the source is created; two sources wrapping the same
/// provider still have different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(Uuid);

impl SourceId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A provider ready to serve lookups
#[derive(Clone)]
pub enum ResolvedSource {
    Plain(Arc<dyn SecretProvider>),
    Cached(Arc<dyn CachedSecretProvider>),
}

impl ResolvedSource {
    /// The cache-aware provider, if this source has one
    pub fn as_cached(&self) -> Option<&Arc<dyn CachedSecretProvider>> {
        match self {
            ResolvedSource::Cached(provider) => Some(provider),
            ResolvedSource::Plain(_) => None,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, ResolvedSource::Cached(_))
    }
}

#[async_trait]
impl SecretProvider for ResolvedSource {
    async fn get_secret(&self, name: &str) -> Result<Secret> {
        match self {
            ResolvedSource::Plain(provider) => provider.get_secret(name).await,
            ResolvedSource::Cached(provider) => provider.get_secret(name).await,
        }
    }

    async fn get_raw_secret(&self, name: &str) -> Result<String> {
        match self {
            ResolvedSource::Plain(provider) => provider.get_raw_secret(name).await,
            ResolvedSource::Cached(provider) => provider.get_raw_secret(name).await,
        }
    }
}

impl fmt::Debug for ResolvedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedSource::Plain(_) => f.write_str("ResolvedSource::Plain"),
            ResolvedSource::Cached(_) => f.write_str("ResolvedSource::Cached"),
        }
    }
}

/// Factory producing a provider once the application's services are known
pub type SourceFactory = Arc<dyn Fn(&Services) -> Result<ResolvedSource> + Send + Sync>;

/// What a source holds
#[derive(Clone)]
pub enum SourceKind {
    Plain(Arc<dyn SecretProvider>),
    Cached(Arc<dyn CachedSecretProvider>),
    Deferred(SourceFactory),
}

/// A single registration in a [`SecretStoreBuilder`](crate::SecretStoreBuilder)
pub struct SecretStoreSource {
    id: SourceId,
    kind: SourceKind,
}

impl SecretStoreSource {
    /// Source serving lookups from a plain provider
    pub fn plain<P: SecretProvider + 'static>(provider: P) -> Self {
        Self::from_provider(Arc::new(provider))
    }

    /// Source serving lookups from a shared plain provider
    pub fn from_provider(provider: Arc<dyn SecretProvider>) -> Self {
        Self::from_kind(SourceKind::Plain(provider))
    }

    /// Source serving lookups from a cache-aware provider
    pub fn cached<P: CachedSecretProvider + 'static>(provider: P) -> Self {
        Self::from_cached(Arc::new(provider))
    }

    /// Source serving lookups from a shared cache-aware provider
    pub fn from_cached(provider: Arc<dyn CachedSecretProvider>) -> Self {
        Self::from_kind(SourceKind::Cached(provider))
    }

    /// Source whose provider is built from the application's services
    pub fn deferred<F>(factory: F) -> Self
    where
        F: Fn(&Services) -> Result<ResolvedSource> + Send + Sync + 'static,
    {
        Self::from_kind(SourceKind::Deferred(Arc::new(factory)))
    }

    fn from_kind(kind: SourceKind) -> Self {
        Self {
            id: SourceId::new(),
            kind,
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn kind(&self) -> &SourceKind {
        &self.kind
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.kind, SourceKind::Deferred(_))
    }

    /// Produce the provider for this source, running its factory if deferred
    pub fn resolve(&self, services: &Services) -> Result<ResolvedSource> {
        match &self.kind {
            SourceKind::Plain(provider) => Ok(ResolvedSource::Plain(Arc::clone(provider))),
            SourceKind::Cached(provider) => Ok(ResolvedSource::Cached(Arc::clone(provider))),
            SourceKind::Deferred(factory) => factory(services),
        }
    }
}

impl fmt::Debug for SecretStoreSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SourceKind::Plain(_) => "plain",
            SourceKind::Cached(_) => "cached",
            SourceKind::Deferred(_) => "deferred",
        };
        f.debug_struct("SecretStoreSource")
            .field("id", &self.id)
            .field("kind", &kind)
            .finish()
    }
}
