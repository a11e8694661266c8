//! Authorized provider tests
//!
//! Uses a probe provider that counts every call so denied lookups can be
//! shown to never reach the wrapped provider.

use async_trait::async_trait;
use futures::future::join_all;
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use warden_authz::{
    AuthorizedCachedSecretProvider, AuthorizedSecretProvider, FixedRoleAuthorization, Role,
    SecretStoreErrorExt,
};
use warden_store::{
    CacheConfig, CachedSecretProvider, InMemorySecretProvider, Secret, SecretProvider,
    SecretStoreError,
};

/// Records every call made to it
#[derive(Default)]
struct ProbeProvider {
    inner: InMemorySecretProvider,
    config: CacheConfig,
    calls: AtomicUsize,
    invalidations: AtomicUsize,
    last_ignore_cache: AtomicBool,
}

impl ProbeProvider {
    fn with_secret(name: &str, value: &str) -> Self {
        Self {
            inner: InMemorySecretProvider::with_secret(name, value),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretProvider for ProbeProvider {
    async fn get_secret(&self, name: &str) -> warden_store::Result<Secret> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_secret(name).await
    }
}

#[async_trait]
impl CachedSecretProvider for ProbeProvider {
    fn configuration(&self) -> &CacheConfig {
        &self.config
    }

    async fn get_cached_secret(&self, name: &str, ignore_cache: bool) -> warden_store::Result<Secret> {
        self.last_ignore_cache.store(ignore_cache, Ordering::SeqCst);
        self.get_secret(name).await
    }

    async fn invalidate_secret(&self, _name: &str) -> warden_store::Result<()> {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn authorized(permitted: Role, current: Role, probe: &Arc<ProbeProvider>) -> AuthorizedSecretProvider {
    AuthorizedSecretProvider::new(
        permitted,
        FixedRoleAuthorization::from(current).shared(),
        probe.clone(),
    )
    .unwrap()
}

fn authorized_cached(permitted: Role, current: Role, probe: &Arc<ProbeProvider>) -> AuthorizedCachedSecretProvider {
    AuthorizedCachedSecretProvider::new(
        permitted,
        FixedRoleAuthorization::from(current).shared(),
        probe.clone(),
    )
    .unwrap()
}

// ============================================================================
// PLAIN PROVIDER
// ============================================================================

#[tokio::test]
async fn test_denied_calls_never_reach_provider() {
    let cases = [
        (Role::Admin, Role::Reader),
        (Role::Writer, Role::Reader),
        (Role::Admin, Role::Writer),
    ];

    for (permitted, current) in cases {
        let probe = Arc::new(ProbeProvider::with_secret("X", "value"));
        let provider = authorized(permitted, current, &probe);

        assert!(provider.get_secret("X").await.unwrap_err().is_authorization_denied());
        assert!(provider.get_raw_secret("X").await.unwrap_err().is_authorization_denied());
        assert_eq!(probe.calls(), 0);
    }
}

#[tokio::test]
async fn test_denial_does_not_reveal_existence() {
    let probe = Arc::new(ProbeProvider::with_secret("exists", "value"));
    let provider = authorized(Role::Admin, Role::Reader, &probe);

    let present = provider.get_raw_secret("exists").await.unwrap_err();
    let absent = provider.get_raw_secret("absent").await.unwrap_err();
    assert_eq!(present.to_string(), absent.to_string());
}

#[tokio::test]
async fn test_authorized_calls_match_direct_calls() {
    let probe = Arc::new(ProbeProvider::with_secret("X", "value"));
    let provider = authorized(Role::Writer, Role::Admin, &probe);

    for _ in 0..3 {
        let direct = probe.get_secret("X").await.unwrap();
        let gated = provider.get_secret("X").await.unwrap();
        assert_eq!(gated, direct);
        assert_eq!(provider.get_raw_secret("X").await.unwrap(), "value");
    }
    assert_eq!(probe.calls(), 9);
}

#[tokio::test]
async fn test_not_found_passes_through_unchanged() {
    let probe = Arc::new(ProbeProvider::default());
    let provider = authorized(Role::Reader, Role::Reader, &probe);

    let err = provider.get_secret("missing").await.unwrap_err();
    assert!(matches!(err, SecretStoreError::NotFound { ref name } if name == "missing"));
    assert_eq!(probe.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_calls() {
    let probe = Arc::new(ProbeProvider::with_secret("X", "value"));
    let provider = Arc::new(authorized(Role::Reader, Role::Writer, &probe));

    let lookups = (0..16).map(|_| {
        let provider = Arc::clone(&provider);
        tokio::spawn(async move { provider.get_raw_secret("X").await })
    });

    for result in join_all(lookups).await {
        assert_eq!(result.unwrap().unwrap(), "value");
    }
    assert_eq!(probe.calls(), 16);
}

// ============================================================================
// CACHE-AWARE PROVIDER
// ============================================================================

#[tokio::test]
async fn test_ignore_cache_forwarded_when_authorized() {
    let probe = Arc::new(ProbeProvider::with_secret("X", "value"));
    let provider = authorized_cached(Role::Writer, Role::Writer, &probe);

    provider.get_cached_secret("X", true).await.unwrap();
    assert!(probe.last_ignore_cache.load(Ordering::SeqCst));

    provider.get_cached_raw_secret("X", false).await.unwrap();
    assert!(!probe.last_ignore_cache.load(Ordering::SeqCst));
    assert_eq!(probe.calls(), 2);
}

#[tokio::test]
async fn test_denied_cache_calls_never_reach_provider() {
    let probe = Arc::new(ProbeProvider::with_secret("X", "value"));
    let provider = authorized_cached(Role::Admin, Role::Writer, &probe);

    for ignore_cache in [true, false] {
        assert!(provider
            .get_cached_secret("X", ignore_cache)
            .await
            .unwrap_err()
            .is_authorization_denied());
        assert!(provider
            .get_cached_raw_secret("X", ignore_cache)
            .await
            .unwrap_err()
            .is_authorization_denied());
    }
    assert!(provider.invalidate_secret("X").await.unwrap_err().is_authorization_denied());
    assert!(provider.get_secret("X").await.unwrap_err().is_authorization_denied());

    assert_eq!(probe.calls(), 0);
    assert_eq!(probe.invalidations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_authorized_invalidation_reaches_provider() {
    let probe = Arc::new(ProbeProvider::default());
    let provider = authorized_cached(Role::Reader, Role::Admin, &probe);

    provider.invalidate_secret("X").await.unwrap();
    assert_eq!(probe.invalidations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_blank_names_rejected() {
    let probe = Arc::new(ProbeProvider::default());
    let provider = authorized_cached(Role::Reader, Role::Admin, &probe);

    assert!(matches!(
        provider.get_cached_secret("", false).await,
        Err(SecretStoreError::InvalidArgument(_))
    ));
    assert!(matches!(
        provider.invalidate_secret(" ").await,
        Err(SecretStoreError::InvalidArgument(_))
    ));
    assert_eq!(probe.calls(), 0);
}

// ============================================================================
// PROPERTIES
// ============================================================================

fn role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_provider_reached_iff_role_superset(permitted in role(), current in role()) {
        let probe = Arc::new(ProbeProvider::with_secret("X", "value"));
        let provider = authorized(permitted, current, &probe);

        let result = tokio_test::block_on(provider.get_raw_secret("X"));
        let superset = current.bits() & permitted.bits() == permitted.bits();

        prop_assert_eq!(result.is_ok(), superset);
        prop_assert_eq!(probe.calls(), usize::from(superset));
        if !superset {
            prop_assert!(result.unwrap_err().is_authorization_denied());
        }
    }
}
