//! Time-bounded secret cache around any provider

use crate::error::{ensure_name, Result};
use crate::provider::{CachedSecretProvider, SecretProvider};
use crate::secret::Secret;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a cached secret is served before it is fetched again
    #[serde(rename = "duration_secs", with = "duration_secs", default = "default_duration")]
    pub duration: Duration,

    /// Maximum number of cached secrets
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_duration() -> Duration { Duration::from_secs(300) }
fn default_capacity() -> usize { 10_000 }

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            capacity: default_capacity(),
        }
    }
}

impl CacheConfig {
    /// Create a configuration with the given retention window
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    /// Set the maximum number of cached secrets
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Cached entry with TTL
#[derive(Clone)]
struct CachedEntry {
    secret: Secret,
    cached_at: Instant,
}

impl CachedEntry {
    fn new(secret: Secret) -> Self {
        Self {
            secret,
            cached_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() > ttl || self.secret.is_expired()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Secret provider that caches the results of an inner provider
///
/// Entries live for [`CacheConfig::duration`]. Lookups with `ignore_cache`
/// always reach the inner provider and refresh the cached entry.
pub struct CachingSecretProvider<P> {
    inner: P,
    entries: DashMap<String, CachedEntry>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: SecretProvider> CachingSecretProvider<P> {
    /// Wrap `inner` with the default cache configuration
    pub fn new(inner: P) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    /// Wrap `inner` with the given cache configuration
    pub fn with_config(inner: P, config: CacheConfig) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Check whether `name` currently has a live cache entry
    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .map(|entry| !entry.is_expired(self.config.duration))
            .unwrap_or(false)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }

    fn lookup(&self, name: &str) -> Option<Secret> {
        let expired = match self.entries.get(name) {
            Some(entry) if !entry.is_expired(self.config.duration) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.secret.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(name);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn store(&self, name: &str, secret: Secret) {
        if self.config.capacity == 0 {
            return;
        }

        if !self.entries.contains_key(name) && self.entries.len() >= self.config.capacity {
            self.evict();
        }
        self.entries.insert(name.to_string(), CachedEntry::new(secret));
    }

    /// Purge expired entries, then the oldest one if still at capacity
    fn evict(&self) {
        let ttl = self.config.duration;
        self.entries.retain(|_, entry| !entry.is_expired(ttl));

        if self.entries.len() < self.config.capacity {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().cached_at)
            .map(|entry| entry.key().clone());

        if let Some(key) = oldest {
            debug!("Evicting cached secret '{}'", key);
            self.entries.remove(&key);
        }
    }
}

#[async_trait]
impl<P: SecretProvider> SecretProvider for CachingSecretProvider<P> {
    async fn get_secret(&self, name: &str) -> Result<Secret> {
        self.get_cached_secret(name, false).await
    }
}

#[async_trait]
impl<P: SecretProvider> CachedSecretProvider for CachingSecretProvider<P> {
    fn configuration(&self) -> &CacheConfig {
        &self.config
    }

    async fn get_cached_secret(&self, name: &str, ignore_cache: bool) -> Result<Secret> {
        ensure_name(name)?;

        if !ignore_cache {
            if let Some(secret) = self.lookup(name) {
                return Ok(secret);
            }
        }

        let secret = self.inner.get_secret(name).await?;
        self.store(name, secret.clone());
        Ok(secret)
    }

    async fn invalidate_secret(&self, name: &str) -> Result<()> {
        ensure_name(name)?;
        if self.entries.remove(name).is_some() {
            debug!("Invalidated cached secret '{}'", name);
        }
        Ok(())
    }
}
