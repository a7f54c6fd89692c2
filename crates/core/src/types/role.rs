//! Account roles.

use serde::{Deserialize, Serialize};

/// Error returned when a role string is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid user role: {0}")]
pub struct ParseRoleError(pub String);

/// Role chosen at sign-up.
///
/// Stored by the synced store as `"FAN"` or `"BAND"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Buys merchandise.
    #[default]
    Fan,
    /// Lists merchandise.
    Band,
}

impl UserRole {
    /// All roles, in the order they are offered at sign-up.
    pub const ALL: [Self; 2] = [Self::Fan, Self::Band];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fan => "Fan",
            Self::Band => "Band",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fan => write!(f, "FAN"),
            Self::Band => write!(f, "BAND"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FAN" => Ok(Self::Fan),
            "BAND" => Ok(Self::Band),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}
