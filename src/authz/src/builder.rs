//! Role-based authorization for secret store builders
//!
//! [`AuthorizedSecretStoreBuilderExt::authorized_within`] restricts every
//! source added by a registration callback to a role, without the callback
//! knowing about authorization:
//!
//! ```rust
//! use warden_authz::{AuthorizedSecretStoreBuilderExt, FixedRoleAuthorization, Role, RoleAuthorization};
//! use warden_store::{InMemorySecretProvider, SecretProvider, SecretStoreBuilder, Services};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = SecretStoreBuilder::new();
//! builder
//!     .add_provider(InMemorySecretProvider::with_secret("app-name", "warden"))
//!     .authorized_within(Role::Admin, |stores| {
//!         stores.add_provider(InMemorySecretProvider::with_secret("db-password", "s3cr3t"));
//!     })?;
//!
//! let services = Services::new().with::<dyn RoleAuthorization>(FixedRoleAuthorization::reader().shared());
//! let store = builder.build(&services)?;
//!
//! assert_eq!(store.get_raw_secret("app-name").await?, "warden");
//! assert!(store.get_raw_secret("db-password").await.is_err());
//! # Ok(())
//! # }
//! ```

use crate::authorization::RoleAuthorization;
use crate::cached::AuthorizedCachedSecretProvider;
use crate::error::{AuthzError, Result};
use crate::provider::AuthorizedSecretProvider;
use crate::role::{IntoRole, Role};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use warden_store::{ResolvedSource, SecretStoreBuilder, SecretStoreSource, SourceId};

/// Authorization extensions on [`SecretStoreBuilder`]
pub trait AuthorizedSecretStoreBuilderExt {
    /// Restrict the sources added by `register` to callers within `role`
    ///
    /// Sources registered before the call are left untouched. Each source
    /// added by `register` is replaced, at the same position, by a deferred
    /// source that wraps it in an authorized provider once the builder is
    /// built. The [`RoleAuthorization`] is taken from the `Services` passed to
    /// `build`, so a missing oracle is reported there.
    ///
    /// Authorization failures are marked critical: a denied source stops a
    /// composite lookup instead of falling through to the next source.
    ///
    /// Fails with `InvalidRole` before `register` runs if `role` is a raw
    /// value outside the defined roles.
    fn authorized_within<R, F>(&mut self, role: R, register: F) -> Result<&mut Self>
    where
        R: IntoRole,
        F: FnOnce(&mut SecretStoreBuilder);
}

impl AuthorizedSecretStoreBuilderExt for SecretStoreBuilder {
    fn authorized_within<R, F>(&mut self, role: R, register: F) -> Result<&mut Self>
    where
        R: IntoRole,
        F: FnOnce(&mut SecretStoreBuilder),
    {
        let role = role.into_role()?;
        self.add_critical_error::<AuthzError>();

        let before: HashSet<SourceId> = self.sources().iter().map(SecretStoreSource::id).collect();
        register(self);

        let sources = self.sources_mut();
        let pending = sources.iter().filter(|source| !before.contains(&source.id())).count();
        if pending == 0 {
            debug!("No secret sources added within role '{}'", role);
            return Ok(self);
        }

        *sources = std::mem::take(sources)
            .into_iter()
            .map(|source| {
                if before.contains(&source.id()) {
                    source
                } else {
                    authorize_source(role, source)
                }
            })
            .collect();

        info!("Restricted {} secret source(s) to role '{}'", pending, role);
        Ok(self)
    }
}

/// Replace `source` by a deferred source wrapping it in an authorized provider
fn authorize_source(role: Role, source: SecretStoreSource) -> SecretStoreSource {
    debug!("Secret source {} requires role '{}'", source.id(), role);

    SecretStoreSource::deferred(move |services| {
        let authorization = services.get_required::<dyn RoleAuthorization>()?;
        let authorized = match source.resolve(services)? {
            ResolvedSource::Plain(provider) => ResolvedSource::Plain(Arc::new(
                AuthorizedSecretProvider::new(role, authorization, provider)?,
            )),
            ResolvedSource::Cached(provider) => ResolvedSource::Cached(Arc::new(
                AuthorizedCachedSecretProvider::new(role, authorization, provider)?,
            )),
        };
        Ok(authorized)
    })
}
