//! Error types for the secret store

use thiserror::Error;

/// Boxed error raised by a secret provider implementation
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Secret store errors
#[derive(Debug, Error)]
pub enum SecretStoreError {
    /// Invalid input (blank secret name, empty collection, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No registered source holds the requested secret
    #[error("Secret '{name}' was not found")]
    NotFound { name: String },

    /// A deferred source or service could not be resolved
    #[error("Resolution failed: {0}")]
    Resolution(String),

    /// Error raised by a provider that is not part of the store's own taxonomy
    #[error(transparent)]
    Provider(BoxError),
}

impl SecretStoreError {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SecretStoreError::InvalidArgument(msg.into())
    }

    /// Create a not found error for the given secret name
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        SecretStoreError::NotFound { name: name.into() }
    }

    /// Wrap a provider-specific error
    pub fn provider<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SecretStoreError::Provider(Box::new(err))
    }

    /// Check whether this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, SecretStoreError::NotFound { .. })
    }

    /// Borrow the wrapped provider error as `E`, if that is what it is
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            SecretStoreError::Provider(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Result type for secret store operations
pub type Result<T> = std::result::Result<T, SecretStoreError>;

/// Reject blank secret names before any provider is consulted
pub fn ensure_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SecretStoreError::invalid_argument(
            "Requires a non-blank secret name to access the secret",
        ));
    }
    Ok(())
}
