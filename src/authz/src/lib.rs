//! # Warden Role-Based Secret Authorization
//!
//! Restricts secret providers to callers within a [`Role`].
//!
//! ## Features
//!
//! - **Role Hierarchy**: Reader ⊂ Writer ⊂ Admin, checked as bit supersets
//! - **Pluggable Oracle**: [`RoleAuthorization`] decides what the current context holds
//! - **Authorized Providers**: plain and cache-aware decorators gate every call
//! - **Builder Rewiring**: [`AuthorizedSecretStoreBuilderExt::authorized_within`]
//!   wraps the sources added by a registration callback
//!
//! ## Module Structure
//!
//! ```text
//! authz/
//! ├── role/           - Role bit patterns and parsing
//! ├── authorization/  - Oracle trait and fixed-role oracle
//! ├── provider/       - Authorized provider and the shared role gate
//! ├── cached/         - Authorized cache-aware provider
//! ├── builder/        - authorized_within builder extension
//! └── config/         - TOML configuration
//! ```

pub mod authorization;
pub mod builder;
pub mod cached;
pub mod config;
pub mod error;
pub mod provider;
pub mod role;

pub use authorization::{FixedRoleAuthorization, RoleAuthorization};
pub use builder::AuthorizedSecretStoreBuilderExt;
pub use cached::AuthorizedCachedSecretProvider;
pub use config::{AuthorizationConfig, AuthorizationSection};
pub use error::{AuthzError, Result, SecretStoreErrorExt};
pub use provider::AuthorizedSecretProvider;
pub use role::{IntoRole, Role};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
