//! Typed service container consulted when deferred sources are resolved

use crate::error::{Result, SecretStoreError};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Services registered by the application, keyed by type
///
/// Trait objects are registered under their `dyn` type:
///
/// ```rust
/// use std::sync::Arc;
/// use warden_store::{InMemorySecretProvider, SecretProvider, Services};
///
/// let mut services = Services::new();
/// services.insert::<dyn SecretProvider>(Arc::new(InMemorySecretProvider::new()));
/// assert!(services.get::<dyn SecretProvider>().is_some());
/// ```
#[derive(Default)]
pub struct Services {
    entries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Services {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service, replacing any previous one of the same type
    pub fn insert<T>(&mut self, service: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.entries.insert(TypeId::of::<T>(), Box::new(service));
        self
    }

    /// Builder-style variant of [`Services::insert`]
    pub fn with<T>(mut self, service: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.insert(service);
        self
    }

    /// Look up a service
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Arc<T>>())
            .cloned()
    }

    /// Look up a service that must have been registered
    pub fn get_required<T>(&self) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get::<T>().ok_or_else(|| {
            SecretStoreError::Resolution(format!(
                "No service of type '{}' has been registered",
                type_name::<T>()
            ))
        })
    }

    /// Number of registered services
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services").field("len", &self.entries.len()).finish()
    }
}
