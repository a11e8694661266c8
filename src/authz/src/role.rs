//! Role hierarchy
//!
//! Roles are bit patterns where each higher role contains every bit of the
//! roles below it:
//!
//! | role   | bits  |
//! |--------|-------|
//! | Reader | `001` |
//! | Writer | `011` |
//! | Admin  | `111` |

use crate::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission level of a caller or the level required by a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RoleValue", into = "&'static str")]
#[repr(u8)]
pub enum Role {
    /// May only read resources
    Reader = 0b001,
    /// May read and write resources
    Writer = 0b011,
    /// May use all available functionality
    Admin = 0b111,
}

impl Role {
    /// Every defined role, lowest first
    pub const ALL: [Role; 3] = [Role::Reader, Role::Writer, Role::Admin];

    /// Bit pattern of the role
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Parse a role from its bit pattern
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0b001 => Ok(Role::Reader),
            0b011 => Ok(Role::Writer),
            0b111 => Ok(Role::Admin),
            other => Err(AuthzError::invalid_role(format!(
                "{:#05b} is not one of reader (0b001), writer (0b011) or admin (0b111)",
                other
            ))),
        }
    }

    /// Whether a caller holding `self` may act where `permitted` is required
    pub const fn satisfies(self, permitted: Role) -> bool {
        self.bits() & permitted.bits() == permitted.bits()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Writer => "writer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reader" => Ok(Role::Reader),
            "writer" => Ok(Role::Writer),
            "admin" => Ok(Role::Admin),
            other => Err(AuthzError::invalid_role(format!("unknown role name '{}'", other))),
        }
    }
}

impl TryFrom<u8> for Role {
    type Error = AuthzError;

    fn try_from(bits: u8) -> Result<Self> {
        Role::from_bits(bits)
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role.bits()
    }
}

impl From<Role> for &'static str {
    fn from(role: Role) -> Self {
        role.as_str()
    }
}

/// Serialized form: a role name or its bit pattern
#[derive(Deserialize)]
#[serde(untagged)]
enum RoleValue {
    Bits(u8),
    Name(String),
}

impl TryFrom<RoleValue> for Role {
    type Error = AuthzError;

    fn try_from(value: RoleValue) -> Result<Self> {
        match value {
            RoleValue::Bits(bits) => Role::from_bits(bits),
            RoleValue::Name(name) => name.parse(),
        }
    }
}

/// Values accepted wherever a role crosses a public boundary
///
/// Raw values are validated here, before any authorization logic runs.
pub trait IntoRole {
    fn into_role(self) -> Result<Role>;
}

impl IntoRole for Role {
    fn into_role(self) -> Result<Role> {
        Ok(self)
    }
}

impl IntoRole for u8 {
    fn into_role(self) -> Result<Role> {
        Role::from_bits(self)
    }
}

impl IntoRole for &str {
    fn into_role(self) -> Result<Role> {
        self.parse()
    }
}

impl IntoRole for String {
    fn into_role(self) -> Result<Role> {
        self.parse()
    }
}
