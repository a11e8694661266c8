//! # Warden Secret Store
//!
//! Pluggable secret retrieval: providers are registered as sources in a
//! [`SecretStoreBuilder`] and looked up in order through a
//! [`CompositeSecretProvider`].
//!
//! ## Module Structure
//!
//! ```text
//! store/
//! ├── provider/    - SecretProvider and CachedSecretProvider traits
//! ├── cache/       - TTL cache around any provider
//! ├── memory/      - In-memory provider
//! ├── source/      - Registration units (plain, cached, deferred)
//! ├── services/    - Typed service container for deferred sources
//! ├── builder/     - Ordered source registration
//! └── composite/   - Chained lookup with critical error handling
//! ```
//!
//! ## Example
//!
//! ```rust
//! use warden_store::{InMemorySecretProvider, SecretProvider, SecretStoreBuilder, Services};
//!
//! # async fn example() -> warden_store::Result<()> {
//! let mut builder = SecretStoreBuilder::new();
//! builder.add_provider(InMemorySecretProvider::with_secret("db-password", "s3cr3t"));
//!
//! let store = builder.build(&Services::new())?;
//! assert_eq!(store.get_raw_secret("db-password").await?, "s3cr3t");
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cache;
pub mod composite;
pub mod error;
pub mod memory;
pub mod provider;
pub mod secret;
pub mod services;
pub mod source;

pub use builder::SecretStoreBuilder;
pub use cache::{CacheConfig, CacheStats, CachingSecretProvider};
pub use composite::{CompositeSecretProvider, CriticalError};
pub use error::{ensure_name, BoxError, Result, SecretStoreError};
pub use memory::InMemorySecretProvider;
pub use provider::{CachedSecretProvider, SecretProvider};
pub use secret::Secret;
pub use services::Services;
pub use source::{ResolvedSource, SecretStoreSource, SourceFactory, SourceId, SourceKind};
