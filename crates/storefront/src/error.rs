//! Unified error handling with Sentry integration.
//!
//! Collaborator failures surface to screens as [`Notice`]s. Failures that
//! point at a bug or a broken deployment are captured to Sentry first.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::notice::{self, ErrorKind, Notice};
use crate::services::identity::IdentityError;
use crate::services::preferences::PreferenceError;
use crate::services::sync::SyncError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Identity service operation failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Synced collection operation failed.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Device preference storage failed.
    #[error("Preference error: {0}")]
    Preferences(#[from] PreferenceError),

    /// Catalog seed file could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Startup configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input rejected before reaching any collaborator.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Failure category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Identity(err) => err.into(),
            Self::Sync(err) => err.into(),
            Self::Preferences(_) | Self::Catalog(_) => ErrorKind::Unknown,
            Self::Config(_) => ErrorKind::BackendMisconfigured,
            Self::Validation(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::Unknown,
        }
    }

    /// Convert to a user-facing notice.
    ///
    /// `context` is a gerund phrase describing what was being attempted.
    #[must_use]
    pub fn to_notice(&self, context: &str, online: bool) -> Notice {
        match self {
            Self::Identity(err) => notice::sign_in_notice(err, online),
            Self::Sync(err) => Notice {
                title: "Error".to_string(),
                message: notice::data_message(err, context),
                kind: Some(err.into()),
                actions: Vec::new(),
            },
            Self::Validation(msg) => Notice {
                title: "Invalid Input".to_string(),
                message: msg.clone(),
                kind: Some(ErrorKind::InvalidInput),
                actions: Vec::new(),
            },
            Self::NotFound(what) => Notice {
                title: "Not Found".to_string(),
                message: format!("{what} is no longer available."),
                kind: None,
                actions: Vec::new(),
            },
            Self::Preferences(_) | Self::Catalog(_) | Self::Config(_) => {
                notice::generic_notice(self, context, online)
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Log a failure and capture it to Sentry when it is not the user's doing.
pub fn report(err: &(dyn std::error::Error + 'static), kind: ErrorKind, context: &str) {
    if matches!(kind, ErrorKind::Unknown | ErrorKind::BackendMisconfigured) {
        let event_id = sentry::capture_error(err);
        tracing::error!(
            error = %err,
            ?kind,
            context,
            sentry_event_id = %event_id,
            "Operation failed"
        );
    } else {
        tracing::warn!(error = %err, ?kind, context, "Operation failed");
    }
}

/// Set the Sentry user context.
///
/// Call this after a successful sign-in to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("item_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
