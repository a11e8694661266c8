//! In-memory secret provider

use crate::error::{ensure_name, Result, SecretStoreError};
use crate::provider::SecretProvider;
use crate::secret::Secret;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Secret provider backed by a shared in-memory map
///
/// Clones share the same map, so a handle kept by the caller sees (and can
/// change) the secrets served by a clone registered in a builder.
#[derive(Clone, Default)]
pub struct InMemorySecretProvider {
    secrets: Arc<RwLock<HashMap<String, Secret>>>,
}

impl InMemorySecretProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider holding a single secret
    pub fn with_secret(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut secrets = HashMap::new();
        secrets.insert(name.into(), Secret::new(value));
        Self {
            secrets: Arc::new(RwLock::new(secrets)),
        }
    }

    /// Create a provider from name/value pairs
    pub fn from_secrets<I, K, V>(secrets: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = HashMap::new();
        for (name, value) in secrets {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(SecretStoreError::invalid_argument(
                    "Requires all secret names to be non-blank",
                ));
            }
            map.insert(name, Secret::new(value));
        }

        Ok(Self {
            secrets: Arc::new(RwLock::new(map)),
        })
    }

    /// Store or replace a secret value
    pub async fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        self.insert_secret(name, Secret::new(value)).await;
    }

    /// Store or replace a secret
    pub async fn insert_secret(&self, name: impl Into<String>, secret: Secret) {
        let mut secrets = self.secrets.write().await;
        secrets.insert(name.into(), secret);
    }

    /// Remove a secret, returning it if it was present
    pub async fn remove(&self, name: &str) -> Option<Secret> {
        let mut secrets = self.secrets.write().await;
        secrets.remove(name)
    }

    /// Number of stored secrets
    pub async fn len(&self) -> usize {
        self.secrets.read().await.len()
    }

    /// Whether no secrets are stored
    pub async fn is_empty(&self) -> bool {
        self.secrets.read().await.is_empty()
    }
}

#[async_trait]
impl SecretProvider for InMemorySecretProvider {
    async fn get_secret(&self, name: &str) -> Result<Secret> {
        ensure_name(name)?;
        let secrets = self.secrets.read().await;
        secrets
            .get(name)
            .cloned()
            .ok_or_else(|| SecretStoreError::not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_and_insert() {
        let provider = InMemorySecretProvider::with_secret("db", "pw");
        assert_eq!(provider.get_raw_secret("db").await.unwrap(), "pw");

        provider.insert("api", "key").await;
        assert_eq!(provider.len().await, 2);
        assert_eq!(provider.get_secret("api").await.unwrap().value, "key");
    }

    #[tokio::test]
    async fn test_missing_secret() {
        let provider = InMemorySecretProvider::new();
        let err = provider.get_secret("nope").await.unwrap_err();
        assert!(matches!(err, SecretStoreError::NotFound { ref name } if name == "nope"));
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let provider = InMemorySecretProvider::new();
        let err = provider.get_secret(" ").await.unwrap_err();
        assert!(matches!(err, SecretStoreError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_clones_share_secrets() {
        let provider = InMemorySecretProvider::new();
        let handle = provider.clone();
        handle.insert("shared", "yes").await;
        assert_eq!(provider.get_raw_secret("shared").await.unwrap(), "yes");
        assert_eq!(handle.remove("shared").await.map(|s| s.value), Some("yes".to_string()));
        assert!(provider.is_empty().await);
    }

    #[test]
    fn test_from_secrets_rejects_blank_names() {
        assert!(InMemorySecretProvider::from_secrets([("a", "1"), ("b", "2")]).is_ok());
        assert!(InMemorySecretProvider::from_secrets([("", "1")]).is_err());
    }
}
