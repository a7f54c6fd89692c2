//! Subcommand implementations.
//!
//! Each command writes its report to the given writer so it can be tested
//! without capturing stdout.

pub mod cart;
pub mod catalog;
pub mod theme;

use bandmerch_core::ParseThemeError;
use bandmerch_storefront::AppError;
use bandmerch_storefront::services::preferences::PreferenceError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Storefront operation failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// Preference file could not be read or written.
    #[error("Preference error: {0}")]
    Preferences(#[from] PreferenceError),

    /// Unrecognized theme value.
    #[error(transparent)]
    Theme(#[from] ParseThemeError),

    /// Writing the report failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Report serialization failed.
    #[error("Output error: {0}")]
    Json(#[from] serde_json::Error),
}
