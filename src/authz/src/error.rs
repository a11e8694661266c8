//! Error types for role-based secret authorization

use crate::role::Role;
use thiserror::Error;
use warden_store::SecretStoreError;

/// Authorization errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// A raw role value outside Reader, Writer and Admin
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// The caller's role does not include the required role
    #[error("Accessing secret is not permitted for role '{role}'")]
    AuthorizationDenied { role: Role },

    /// Invalid input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Secret store error
    #[error("Secret store error: {0}")]
    Store(#[from] SecretStoreError),
}

impl AuthzError {
    /// Create an invalid role error
    pub fn invalid_role<S: Into<String>>(msg: S) -> Self {
        AuthzError::InvalidRole(msg.into())
    }

    /// Check whether this is an authorization denial
    pub fn is_denied(&self) -> bool {
        matches!(self, AuthzError::AuthorizationDenied { .. })
    }

    /// Recover the authorization error carried by a secret store error
    pub fn from_store(err: &SecretStoreError) -> Option<&AuthzError> {
        err.downcast_ref::<AuthzError>()
    }
}

/// Authorization failures travel through the secret store as provider errors,
/// so a composite lookup can recognise them as critical.
impl From<AuthzError> for SecretStoreError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Store(inner) => inner,
            AuthzError::InvalidArgument(msg) => SecretStoreError::InvalidArgument(msg),
            other => SecretStoreError::provider(other),
        }
    }
}

/// Authorization queries on secret store errors
pub trait SecretStoreErrorExt {
    /// The authorization error carried by this error, if any
    fn authorization_error(&self) -> Option<&AuthzError>;

    /// Whether this error is an authorization denial
    fn is_authorization_denied(&self) -> bool {
        self.authorization_error().map(AuthzError::is_denied).unwrap_or(false)
    }
}

impl SecretStoreErrorExt for SecretStoreError {
    fn authorization_error(&self) -> Option<&AuthzError> {
        AuthzError::from_store(self)
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
