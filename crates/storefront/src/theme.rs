//! Theme preference and palettes.

use std::sync::Arc;

use tracing::warn;

use bandmerch_core::ThemePreference;

use crate::services::preferences::{PreferenceError, PreferenceStore};

/// Preference key holding the theme choice.
pub const THEME_PREFERENCE_KEY: &str = "themePreference";

/// Colors used by every screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub border: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
}

pub const LIGHT: Palette = Palette {
    background: "#ffffff",
    card: "#f8f9fa",
    text: "#000000",
    border: "#e1e5e9",
    primary: "#4444DD",
    secondary: "#6D28D9",
};

pub const DARK: Palette = Palette {
    background: "#000000",
    card: "#1f1f1f",
    text: "#ffffff",
    border: "#444444",
    primary: "#4444DD",
    secondary: "#6D28D9",
};

/// The loaded theme choice plus the device's current color scheme.
pub struct ThemeSettings {
    store: Arc<dyn PreferenceStore>,
    preference: ThemePreference,
    system_is_dark: bool,
}

impl std::fmt::Debug for ThemeSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeSettings")
            .field("preference", &self.preference)
            .field("system_is_dark", &self.system_is_dark)
            .finish_non_exhaustive()
    }
}

impl ThemeSettings {
    /// Load the saved preference.
    ///
    /// A missing, unrecognized or unreadable value leaves the preference at
    /// `System`; read failures are logged, not returned.
    pub async fn load(store: Arc<dyn PreferenceStore>, system_is_dark: bool) -> Self {
        let preference = match store.get(THEME_PREFERENCE_KEY).await {
            Ok(Some(saved)) => saved.parse().unwrap_or_else(|e| {
                warn!(error = %e, "ignoring saved theme preference");
                ThemePreference::System
            }),
            Ok(None) => ThemePreference::System,
            Err(e) => {
                warn!(error = %e, "failed to load theme preference");
                ThemePreference::System
            }
        };

        Self {
            store,
            preference,
            system_is_dark,
        }
    }

    #[must_use]
    pub const fn preference(&self) -> ThemePreference {
        self.preference
    }

    #[must_use]
    pub const fn is_dark(&self) -> bool {
        self.preference.is_dark(self.system_is_dark)
    }

    #[must_use]
    pub const fn palette(&self) -> &'static Palette {
        if self.is_dark() { &DARK } else { &LIGHT }
    }

    /// The device switched between light and dark mode.
    pub const fn set_system_dark(&mut self, system_is_dark: bool) {
        self.system_is_dark = system_is_dark;
    }

    /// Persist and apply a new preference.
    ///
    /// # Errors
    ///
    /// Returns the store error; the in-memory preference is left unchanged
    /// when saving fails.
    pub async fn set(&mut self, preference: ThemePreference) -> Result<(), PreferenceError> {
        self.store
            .set(THEME_PREFERENCE_KEY, preference.as_str())
            .await?;
        self.preference = preference;
        Ok(())
    }
}
