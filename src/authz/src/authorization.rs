//! Role authorization oracles

use crate::error::Result;
use crate::role::{IntoRole, Role};
use async_trait::async_trait;
use std::sync::Arc;

/// Decides whether the current context holds a required role
///
/// Implementations may consult a remote policy service; the check is async
/// for that reason.
#[async_trait]
pub trait RoleAuthorization: Send + Sync {
    /// Whether the current context is authorized for `permitted`
    async fn is_authorized(&self, permitted: Role) -> Result<bool>;
}

/// Oracle whose current role never changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRoleAuthorization {
    current: Role,
}

impl FixedRoleAuthorization {
    /// Create an oracle for the given current role
    ///
    /// Fails with `InvalidRole` for raw values outside the defined roles.
    pub fn new(current: impl IntoRole) -> Result<Self> {
        Ok(Self {
            current: current.into_role()?,
        })
    }

    /// Oracle for a caller in the Reader role
    pub const fn reader() -> Self {
        Self { current: Role::Reader }
    }

    /// Oracle for a caller in the Writer role
    pub const fn writer() -> Self {
        Self { current: Role::Writer }
    }

    /// Oracle for a caller in the Admin role
    pub const fn admin() -> Self {
        Self { current: Role::Admin }
    }

    pub fn current_role(&self) -> Role {
        self.current
    }

    /// Share the oracle as a trait object, ready for a `Services` container
    pub fn shared(self) -> Arc<dyn RoleAuthorization> {
        Arc::new(self)
    }
}

impl From<Role> for FixedRoleAuthorization {
    fn from(current: Role) -> Self {
        Self { current }
    }
}

#[async_trait]
impl RoleAuthorization for FixedRoleAuthorization {
    async fn is_authorized(&self, permitted: Role) -> Result<bool> {
        Ok(self.current.satisfies(permitted))
    }
}
