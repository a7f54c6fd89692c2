//! User-facing messages for collaborator failures.
//!
//! Every failure the screens see is turned into a [`Notice`]: a title and a
//! message shown in a blocking alert. Nothing here retries.

use serde::Serialize;

use crate::error::report;
use crate::navigation::Route;
use crate::services::identity::IdentityError;
use crate::services::sync::SyncError;

/// Failure categories shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnverifiedAccount,
    InvalidCredentials,
    AccountNotFound,
    InvalidInput,
    RateLimited,
    NetworkUnavailable,
    BackendMisconfigured,
    Unknown,
}

impl From<&IdentityError> for ErrorKind {
    fn from(err: &IdentityError) -> Self {
        match err {
            IdentityError::UserNotConfirmed => Self::UnverifiedAccount,
            IdentityError::NotAuthorized(_) | IdentityError::PasswordResetRequired => {
                Self::InvalidCredentials
            }
            IdentityError::UserNotFound => Self::AccountNotFound,
            IdentityError::InvalidParameter(_)
            | IdentityError::InvalidPassword(_)
            | IdentityError::UsernameExists
            | IdentityError::CodeMismatch
            | IdentityError::ExpiredCode
            | IdentityError::CodeDeliveryFailure => Self::InvalidInput,
            IdentityError::TooManyRequests | IdentityError::LimitExceeded => Self::RateLimited,
            IdentityError::Network(_) => Self::NetworkUnavailable,
            IdentityError::Misconfigured(_) | IdentityError::ServiceUnavailable(_) => {
                Self::BackendMisconfigured
            }
            IdentityError::Unknown { .. } => Self::Unknown,
        }
    }
}

impl From<&SyncError> for ErrorKind {
    fn from(err: &SyncError) -> Self {
        match err {
            SyncError::Network(_) | SyncError::Timeout => Self::NetworkUnavailable,
            SyncError::Unauthorized(_) => Self::InvalidCredentials,
            SyncError::Config(_) => Self::BackendMisconfigured,
            SyncError::Engine(_) | SyncError::Transport(_) | SyncError::Service(_) => {
                Self::Unknown
            }
        }
    }
}

/// Extra button on a notice that leads somewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeAction {
    pub label: String,
    pub route: Route,
}

/// A blocking alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub kind: Option<ErrorKind>,
    /// Buttons besides the implicit "OK".
    pub actions: Vec<NoticeAction>,
}

impl Notice {
    /// An informational notice (no failure).
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: None,
            actions: Vec::new(),
        }
    }

    fn error(kind: ErrorKind, title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
            kind: Some(kind),
            actions: Vec::new(),
        }
    }

    /// Add a button leading to `route`.
    #[must_use]
    pub fn with_action(mut self, label: impl Into<String>, route: Route) -> Self {
        self.actions.push(NoticeAction {
            label: label.into(),
            route,
        });
        self
    }
}

const CONNECTION_TITLE: &str = "Connection Problem";
const OFFLINE_HINT: &str = " It looks like you're offline - please check your internet connection.";

fn unexpected(kind: ErrorKind, during: &str, code: Option<&str>, online: bool) -> Notice {
    let details = code.map(|c| format!(" (Error: {c})")).unwrap_or_default();
    let hint = if online { "" } else { OFFLINE_HINT };
    Notice::error(
        kind,
        "Unexpected Error",
        format!(
            "Something unexpected happened during {during}{details}. Please try again.{hint} \
             If the problem continues, please restart the app or contact support."
        ),
    )
}

fn unknown_code(err: &IdentityError) -> Option<&str> {
    match err {
        IdentityError::Unknown { code, .. } => code.as_deref(),
        _ => None,
    }
}

/// Notice for a failed sign-in.
///
/// Account-not-found notices offer a "Create Account" button.
#[must_use]
pub fn sign_in_notice(err: &IdentityError, online: bool) -> Notice {
    let kind = ErrorKind::from(err);
    report(err, kind, "authentication");

    match err {
        IdentityError::UserNotConfirmed => Notice::error(
            kind,
            "Email Verification Required",
            "Your account needs to be verified. Please check your email for the verification code. \
             If you didn't receive the email, check your spam folder or request a new code.",
        ),
        IdentityError::NotAuthorized(_) => Notice::error(
            kind,
            "Invalid Credentials",
            "The email or password you entered is incorrect. Please double-check your credentials and try again.",
        ),
        IdentityError::UserNotFound => Notice::error(
            kind,
            "Account Not Found",
            "No account exists with this email address. Would you like to create a new account instead?",
        )
        .with_action("Create Account", Route::SignUp),
        IdentityError::InvalidParameter(_) => Notice::error(
            kind,
            "Invalid Email Format",
            "Please enter a valid email address (e.g., yourname@example.com) and try again.",
        ),
        IdentityError::TooManyRequests => Notice::error(
            kind,
            "Too Many Attempts",
            "You've made too many sign-in attempts. Please wait a few minutes before trying again, \
             or reset your password if you've forgotten it.",
        ),
        IdentityError::LimitExceeded => Notice::error(
            kind,
            "Rate Limit Exceeded",
            "Too many requests from this device. Please wait 15 minutes before trying again.",
        ),
        IdentityError::PasswordResetRequired => Notice::error(
            kind,
            "Password Reset Required",
            "Your password needs to be reset. Please use the 'Forgot Password' option to set a new password.",
        ),
        IdentityError::Misconfigured(_) => Notice::error(
            kind,
            "Service Configuration Error",
            "There's a temporary issue with our authentication service. Please try again in a few minutes.",
        ),
        IdentityError::ServiceUnavailable(_) => Notice::error(
            kind,
            "Service Temporarily Unavailable",
            "Our authentication service is temporarily experiencing issues. Please try again in a few minutes.",
        ),
        IdentityError::Network(_) => Notice::error(
            kind,
            CONNECTION_TITLE,
            "Unable to connect to our servers. Please check your internet connection and try again.",
        ),
        _ => unexpected(kind, "sign in", unknown_code(err), online),
    }
}

/// Notice for a failed sign-up.
#[must_use]
pub fn sign_up_notice(err: &IdentityError, online: bool) -> Notice {
    let kind = ErrorKind::from(err);
    report(err, kind, "signup");

    match err {
        IdentityError::UsernameExists => account_exists(),
        IdentityError::InvalidPassword(_) => Notice::error(
            kind,
            "Password Requirements Not Met",
            "Your password doesn't meet our security requirements. Please ensure it has at least 8 characters \
             with a mix of letters, numbers, and symbols.",
        ),
        IdentityError::InvalidParameter(_) => Notice::error(
            kind,
            "Invalid Information",
            "Please check that all fields are filled out correctly. Make sure your email is valid and password meets requirements.",
        ),
        IdentityError::LimitExceeded | IdentityError::TooManyRequests => Notice::error(
            kind,
            "Too Many Attempts",
            "You've made too many signup attempts. Please wait a few minutes before trying again.",
        ),
        IdentityError::CodeDeliveryFailure => Notice::error(
            kind,
            "Email Delivery Issue",
            "We couldn't send the verification email. Please check that your email address is correct and try again.",
        ),
        IdentityError::Misconfigured(_) => Notice::error(
            kind,
            "Email Service Issue",
            "There's a temporary issue with our email service. Please try again in a few minutes.",
        ),
        IdentityError::NotAuthorized(_) => Notice::error(
            kind,
            "Account Creation Not Allowed",
            "Account creation is currently not available. Please try again later or contact support.",
        ),
        IdentityError::ServiceUnavailable(_) => Notice::error(
            kind,
            "Service Temporarily Unavailable",
            "Our signup service is temporarily experiencing issues. Please try again in a few minutes.",
        ),
        IdentityError::Network(_) => Notice::error(
            kind,
            CONNECTION_TITLE,
            "Unable to connect to our servers. Please check your internet connection and try again.",
        ),
        _ => unexpected(kind, "account creation", unknown_code(err), online),
    }
}

/// Notice shown when a profile already exists for the email.
#[must_use]
pub fn account_exists() -> Notice {
    Notice::error(
        ErrorKind::InvalidInput,
        "Account Already Exists",
        "An account with this email already exists. Try logging in instead or use a different email address.",
    )
    .with_action("Sign In", Route::SignIn)
}

/// Notice for a failed confirmation or code resend.
#[must_use]
pub fn verify_notice(err: &IdentityError) -> Notice {
    let kind = ErrorKind::from(err);
    report(err, kind, "verification");

    match err {
        IdentityError::CodeMismatch => Notice::error(
            kind,
            "Invalid Code",
            "The verification code you entered is incorrect. Please try again.",
        ),
        IdentityError::ExpiredCode => Notice::error(
            kind,
            "Code Expired",
            "This verification code has expired. Please request a new one.",
        ),
        IdentityError::LimitExceeded | IdentityError::TooManyRequests => Notice::error(
            kind,
            "Too Many Attempts",
            "You've made too many attempts. Please wait a few minutes before trying again.",
        ),
        IdentityError::Network(_) => Notice::error(
            kind,
            CONNECTION_TITLE,
            "Please check your internet connection and try again.",
        ),
        _ => Notice::error(
            kind,
            "Verification Failed",
            "We couldn't verify your email right now. Please try again.",
        ),
    }
}

/// One-line message for a failed catalog or profile load.
///
/// `operation` reads as a gerund phrase, e.g. `"loading bands"`.
#[must_use]
pub fn data_message(err: &SyncError, operation: &str) -> String {
    let kind = ErrorKind::from(err);
    report(err, kind, "datastore");

    match err {
        SyncError::Network(_) => {
            "Connection issue - please check your internet and try again".to_string()
        }
        SyncError::Unauthorized(_) => "Authentication issue - please try logging in again".to_string(),
        SyncError::Engine(_) => "Database sync issue - trying to reconnect automatically".to_string(),
        SyncError::Transport(_) => "Server communication issue - please try again".to_string(),
        SyncError::Config(_) => "App configuration issue - please restart the app".to_string(),
        SyncError::Timeout => "Connection timeout - please try again".to_string(),
        SyncError::Service(msg) if !msg.is_empty() => format!("Service issue: {msg}"),
        SyncError::Service(_) => format!("Unable to complete {operation} right now"),
    }
}

/// Fallback notice for failures outside sign-in, sign-up and data loading.
///
/// `context` reads as a gerund phrase, e.g. `"saving your settings"`.
#[must_use]
pub fn generic_notice(err: &(dyn std::error::Error + 'static), context: &str, online: bool) -> Notice {
    let network = !online || crate::services::identity::looks_like_network_failure(&err.to_string());
    let kind = if network {
        ErrorKind::NetworkUnavailable
    } else {
        ErrorKind::Unknown
    };
    report(err, kind, context);

    if network {
        return Notice::error(
            kind,
            CONNECTION_TITLE,
            "Please check your internet connection and try again.",
        );
    }
    Notice::error(
        kind,
        "Something Went Wrong",
        format!(
            "We encountered an issue while {context}. Please try again or restart the app if the problem persists."
        ),
    )
}
