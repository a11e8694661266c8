//! Authorized secret provider
//!
//! Wraps a [`SecretProvider`] so that every lookup first asks a
//! [`RoleAuthorization`] whether the current context holds the required role.
//! Denied lookups never reach the wrapped provider.

use crate::authorization::RoleAuthorization;
use crate::error::{AuthzError, Result};
use crate::role::{IntoRole, Role};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};
use warden_store::{ensure_name, Secret, SecretProvider, SecretStoreError};

/// The role check shared by the authorized providers
#[derive(Clone)]
pub(crate) struct RoleGate {
    role: Role,
    authorization: Arc<dyn RoleAuthorization>,
}

impl RoleGate {
    pub(crate) fn new(role: impl IntoRole, authorization: Arc<dyn RoleAuthorization>) -> Result<Self> {
        Ok(Self {
            role: role.into_role()?,
            authorization,
        })
    }

    pub(crate) fn role(&self) -> Role {
        self.role
    }

    /// Run `operation` only when the current context holds the required role
    ///
    /// On denial `operation` is never invoked and `AuthorizationDenied` is
    /// returned. Covers value-less operations too (`T = ()`). Oracle failures
    /// are carried as provider errors so a composite lookup treats them as
    /// critical.
    pub(crate) async fn when_authorized<T, F, Fut>(&self, operation: F) -> warden_store::Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = warden_store::Result<T>>,
    {
        let authorized = self
            .authorization
            .is_authorized(self.role)
            .await
            .map_err(SecretStoreError::provider)?;
        if !authorized {
            warn!(role = %self.role, "Secret access denied: caller lacks the required role");
            return Err(AuthzError::AuthorizationDenied { role: self.role }.into());
        }

        debug!(role = %self.role, "Secret access authorized");
        operation().await
    }
}

/// Secret provider that only serves callers within a required role
pub struct AuthorizedSecretProvider {
    gate: RoleGate,
    provider: Arc<dyn SecretProvider>,
}

impl AuthorizedSecretProvider {
    /// Restrict `provider` to callers that `authorization` considers within `role`
    ///
    /// Fails with `InvalidRole` for raw role values outside the defined roles.
    pub fn new(
        role: impl IntoRole,
        authorization: Arc<dyn RoleAuthorization>,
        provider: Arc<dyn SecretProvider>,
    ) -> Result<Self> {
        Ok(Self {
            gate: RoleGate::new(role, authorization)?,
            provider,
        })
    }

    /// The role required to access the wrapped provider
    pub fn role(&self) -> Role {
        self.gate.role()
    }
}

#[async_trait]
impl SecretProvider for AuthorizedSecretProvider {
    async fn get_secret(&self, name: &str) -> warden_store::Result<Secret> {
        ensure_name(name)?;
        self.gate.when_authorized(|| self.provider.get_secret(name)).await
    }

    async fn get_raw_secret(&self, name: &str) -> warden_store::Result<String> {
        ensure_name(name)?;
        self.gate.when_authorized(|| self.provider.get_raw_secret(name)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::FixedRoleAuthorization;
    use crate::error::SecretStoreErrorExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use warden_store::InMemorySecretProvider;

    struct FailingOracle;

    #[async_trait]
    impl RoleAuthorization for FailingOracle {
        async fn is_authorized(&self, _permitted: Role) -> Result<bool> {
            Err(AuthzError::InvalidArgument("policy service unavailable".to_string()))
        }
    }

    fn gate(current: FixedRoleAuthorization, required: Role) -> RoleGate {
        RoleGate::new(required, current.shared()).unwrap()
    }

    #[tokio::test]
    async fn test_gate_runs_operation_when_authorized() {
        let calls = AtomicUsize::new(0);
        let gate = gate(FixedRoleAuthorization::admin(), Role::Writer);

        let result = gate
            .when_authorized(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gate_short_circuits_when_denied() {
        let calls = AtomicUsize::new(0);
        let gate = gate(FixedRoleAuthorization::reader(), Role::Writer);

        let result = gate
            .when_authorized(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(result.unwrap_err().is_authorization_denied());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oracle_failure_propagates() {
        let provider = AuthorizedSecretProvider::new(
            Role::Reader,
            Arc::new(FailingOracle),
            Arc::new(InMemorySecretProvider::with_secret("k", "v")),
        )
        .unwrap();

        let err = provider.get_secret("k").await.unwrap_err();
        assert!(matches!(
            err.authorization_error(),
            Some(AuthzError::InvalidArgument(ref msg)) if msg.contains("unavailable")
        ));
    }

    #[tokio::test]
    async fn test_blank_name_rejected_before_authorization() {
        let provider = AuthorizedSecretProvider::new(
            Role::Reader,
            Arc::new(FailingOracle),
            Arc::new(InMemorySecretProvider::new()),
        )
        .unwrap();

        assert!(matches!(
            provider.get_raw_secret("  ").await,
            Err(SecretStoreError::InvalidArgument(ref msg)) if msg.contains("non-blank")
        ));
    }

    #[test]
    fn test_invalid_role_rejected() {
        let result = AuthorizedSecretProvider::new(
            6u8,
            FixedRoleAuthorization::admin().shared(),
            Arc::new(InMemorySecretProvider::new()),
        );
        assert!(matches!(result, Err(AuthzError::InvalidRole(_))));
    }
}
