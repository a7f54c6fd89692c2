//! Identity service error types.

use thiserror::Error;

/// Errors returned by the identity service.
///
/// The managed service reports failures as string codes; [`IdentityError::from_code`]
/// turns them into this closed set.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The account exists but its email was never confirmed.
    #[error("user is not confirmed")]
    UserNotConfirmed,

    /// Wrong password, or the operation is not allowed for this account.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// No account for the username.
    #[error("user not found")]
    UserNotFound,

    /// A request field was rejected.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Too many requests for this account.
    #[error("too many requests")]
    TooManyRequests,

    /// Too many requests from this device.
    #[error("limit exceeded")]
    LimitExceeded,

    /// The password must be reset before signing in.
    #[error("password reset required")]
    PasswordResetRequired,

    /// An account already exists for the username.
    #[error("username already exists")]
    UsernameExists,

    /// The password does not satisfy the pool policy.
    #[error("invalid password: {0}")]
    InvalidPassword(String),

    /// The confirmation code is wrong.
    #[error("confirmation code mismatch")]
    CodeMismatch,

    /// The confirmation code has expired.
    #[error("confirmation code expired")]
    ExpiredCode,

    /// The confirmation email could not be delivered.
    #[error("code delivery failed")]
    CodeDeliveryFailure,

    /// The backend is misconfigured.
    #[error("service misconfigured: {0}")]
    Misconfigured(String),

    /// The backend reported an internal failure.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The device could not reach the service.
    #[error("network error: {0}")]
    Network(String),

    /// Anything else.
    #[error("identity error {}: {message}", .code.as_deref().unwrap_or("(no code)"))]
    Unknown {
        code: Option<String>,
        message: String,
    },
}

impl IdentityError {
    /// Map a service error code and message to an `IdentityError`.
    ///
    /// Unrecognized codes fall back to the message: connectivity wording
    /// becomes [`IdentityError::Network`], anything else
    /// [`IdentityError::Unknown`].
    #[must_use]
    pub fn from_code(code: &str, message: &str) -> Self {
        let msg = || message.to_string();
        match code {
            "UserNotConfirmedException" | "UserNotVerifiedException" => Self::UserNotConfirmed,
            "NotAuthorizedException" => Self::NotAuthorized(msg()),
            "UserNotFoundException" => Self::UserNotFound,
            "InvalidParameterException" => Self::InvalidParameter(msg()),
            "TooManyRequestsException" => Self::TooManyRequests,
            "LimitExceededException" => Self::LimitExceeded,
            "PasswordResetRequiredException" => Self::PasswordResetRequired,
            "UsernameExistsException" => Self::UsernameExists,
            "InvalidPasswordException" => Self::InvalidPassword(msg()),
            "CodeMismatchException" => Self::CodeMismatch,
            "ExpiredCodeException" => Self::ExpiredCode,
            "CodeDeliveryFailureException" => Self::CodeDeliveryFailure,
            "InvalidUserPoolConfigurationException"
            | "ResourceNotFoundException"
            | "InvalidEmailRoleAccessPolicyException" => Self::Misconfigured(msg()),
            "InternalErrorException" => Self::ServiceUnavailable(msg()),
            "NetworkError" => Self::Network(msg()),
            _ if looks_like_network_failure(message) => Self::Network(msg()),
            _ => Self::Unknown {
                code: (!code.is_empty()).then(|| code.to_string()),
                message: msg(),
            },
        }
    }
}

/// Whether an error message describes a connectivity failure.
pub(crate) fn looks_like_network_failure(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    ["network", "fetch", "timeout", "timed out"]
        .iter()
        .any(|needle| lower.contains(needle))
}
