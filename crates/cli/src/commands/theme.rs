//! Theme preference commands.
//!
//! # Usage
//!
//! ```bash
//! bandmerch theme get
//! bandmerch theme set dark
//! ```
//!
//! The preference lives in the JSON file named by `BANDMERCH_PREFERENCES_PATH`.

use std::io::Write;

use bandmerch_core::ThemePreference;
use bandmerch_storefront::AppState;
use bandmerch_storefront::theme::ThemeSettings;

use super::CommandError;

/// Print the saved theme preference.
///
/// # Errors
///
/// Returns an error if the write fails.
pub async fn get(state: &AppState, out: &mut impl Write) -> Result<(), CommandError> {
    let settings = ThemeSettings::load(state.preferences().clone(), false).await;
    writeln!(out, "{}", settings.preference().as_str())?;
    Ok(())
}

/// Save a new theme preference.
///
/// # Errors
///
/// Returns an error if `value` is not `system`, `light` or `dark`, or the
/// preference file cannot be written.
pub async fn set(state: &AppState, value: &str, out: &mut impl Write) -> Result<(), CommandError> {
    let preference: ThemePreference = value.trim().parse()?;
    let mut settings = ThemeSettings::load(state.preferences().clone(), false).await;
    settings.set(preference).await?;
    tracing::info!(
        theme = preference.as_str(),
        path = %state.config().preferences_path.display(),
        "theme saved"
    );
    writeln!(out, "{}", preference.as_str())?;
    Ok(())
}
