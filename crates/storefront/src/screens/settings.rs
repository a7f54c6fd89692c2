//! Settings screen: theme choice and sign-out.

use tracing::info;

use bandmerch_core::ThemePreference;

use crate::error::AppError;
use crate::navigation::Route;
use crate::screens::Outcome;
use crate::state::AppState;
use crate::theme::{Palette, ThemeSettings};

/// One row of the theme picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeOption {
    pub preference: ThemePreference,
    pub label: &'static str,
    pub selected: bool,
}

const THEME_LABELS: [(ThemePreference, &str); 3] = [
    (ThemePreference::System, "Use System Setting"),
    (ThemePreference::Light, "Light"),
    (ThemePreference::Dark, "Dark"),
];

/// Settings screen state.
pub struct SettingsScreen {
    state: AppState,
    theme: ThemeSettings,
}

impl SettingsScreen {
    /// Load the saved theme from the device preferences.
    pub async fn open(state: AppState, system_is_dark: bool) -> Self {
        let theme = ThemeSettings::load(state.preferences().clone(), system_is_dark).await;
        Self { state, theme }
    }

    #[must_use]
    pub fn options(&self) -> Vec<ThemeOption> {
        THEME_LABELS
            .iter()
            .map(|&(preference, label)| ThemeOption {
                preference,
                label,
                selected: preference == self.theme.preference(),
            })
            .collect()
    }

    #[must_use]
    pub const fn theme(&self) -> &ThemeSettings {
        &self.theme
    }

    #[must_use]
    pub const fn palette(&self) -> &'static Palette {
        self.theme.palette()
    }

    pub const fn set_system_dark(&mut self, system_is_dark: bool) {
        self.theme.set_system_dark(system_is_dark);
    }

    /// Save and apply a theme choice.
    pub async fn select_theme(&mut self, preference: ThemePreference) -> Outcome {
        match self.theme.set(preference).await {
            Ok(()) => {
                info!(theme = preference.as_str(), "theme changed");
                Outcome::Stay
            }
            Err(err) => Outcome::Notice(
                AppError::from(err).to_notice("saving your settings", self.state.is_online()),
            ),
        }
    }

    /// Sign out and return to the sign-in screen.
    #[must_use]
    pub fn sign_out(&self) -> Outcome {
        self.state.sign_out();
        Outcome::reset(Route::SignIn)
    }
}
