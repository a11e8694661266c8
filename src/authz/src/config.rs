//! Authorization configuration loading and validation
//!
//! ```toml
//! [authorization]
//! current_role = "writer"
//! required_role = "admin"
//!
//! [cache]
//! duration_secs = 300
//! capacity = 1000
//! ```

use crate::authorization::FixedRoleAuthorization;
use crate::role::Role;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use warden_store::CacheConfig;

/// Complete authorization configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthorizationConfig {
    pub authorization: AuthorizationSection,

    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthorizationSection {
    /// Role held by this process
    pub current_role: Role,

    /// Role required for restricted secret sources
    #[serde(default = "default_required_role")]
    pub required_role: Role,
}

fn default_required_role() -> Role { Role::Admin }

impl AuthorizationConfig {
    /// Configuration for a process holding `current_role`
    pub fn new(current_role: Role) -> Self {
        Self {
            authorization: AuthorizationSection {
                current_role,
                required_role: default_required_role(),
            },
            cache: CacheConfig::default(),
        }
    }

    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read configuration file {:?}", path.as_ref()))?;

        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse authorization configuration")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.cache.duration.is_zero() {
            anyhow::bail!("Cache duration must be greater than zero");
        }

        if self.cache.capacity == 0 {
            anyhow::bail!("Cache capacity must be greater than zero");
        }

        Ok(())
    }

    /// Oracle answering for the configured current role
    pub fn authorization(&self) -> FixedRoleAuthorization {
        FixedRoleAuthorization::from(self.authorization.current_role)
    }
}
