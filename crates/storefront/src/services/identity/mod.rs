//! Identity service.
//!
//! Sign-up, sign-in and email confirmation are handled by the managed
//! backend. This module defines the calls the app makes and the request and
//! response types; token storage and refresh stay inside the backend client.

mod error;
pub mod memory;

pub use error::IdentityError;
pub(crate) use error::looks_like_network_failure;
pub use memory::MemoryIdentity;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;

use bandmerch_core::{Email, UserId};

/// Minimum password length enforced by the user pool.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Username and password for signing in.
///
/// The email address doubles as the username.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: Email,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: Email, password: &str) -> Self {
        Self {
            username,
            password: SecretString::from(password.trim().to_string()),
        }
    }
}

/// A sign-up request. The email is both the username and the contact address.
pub type SignUpRequest = Credentials;

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: Email,
    /// Stable account identifier assigned by the service.
    pub user_id: UserId,
    pub signed_in_at: DateTime<Utc>,
}

/// Returned by sign-up: the account exists but must be confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub username: Email,
    /// Where the code was sent, partially masked (e.g. `f***@example.com`).
    pub destination: String,
}

/// The managed identity service.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, IdentityError>;

    async fn sign_up(&self, request: &SignUpRequest) -> Result<PendingConfirmation, IdentityError>;

    async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<(), IdentityError>;

    async fn resend_code(&self, username: &str) -> Result<(), IdentityError>;
}

/// Mask an email address for display: first character of the local part,
/// then `***`, then the domain.
#[must_use]
pub fn mask_destination(email: &Email) -> String {
    let first = email.as_str().chars().next().unwrap_or('*');
    format!("{first}***@{}", email.domain())
}
