//! Theme preference.

use serde::{Deserialize, Serialize};

/// Error returned when a stored theme value is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid theme preference: {0}")]
pub struct ParseThemeError(pub String);

/// The user's theme choice, persisted as `"system"`, `"light"` or `"dark"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThemePreference {
    /// Follow the device color scheme.
    #[default]
    System,
    Light,
    Dark,
}

impl ThemePreference {
    /// The persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Resolve to dark or light given whether the device is in dark mode.
    #[must_use]
    pub const fn is_dark(self, system_is_dark: bool) -> bool {
        match self {
            Self::System => system_is_dark,
            Self::Light => false,
            Self::Dark => true,
        }
    }
}

impl std::fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ThemePreference {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(ParseThemeError(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_values_only() {
        assert_eq!("dark".parse::<ThemePreference>().unwrap(), ThemePreference::Dark);
        assert!("Dark".parse::<ThemePreference>().is_err());
        assert!("sepia".parse::<ThemePreference>().is_err());
    }

    #[test]
    fn test_is_dark_resolution() {
        assert!(ThemePreference::System.is_dark(true));
        assert!(!ThemePreference::System.is_dark(false));
        assert!(!ThemePreference::Light.is_dark(true));
        assert!(ThemePreference::Dark.is_dark(false));
    }
}
