//! In-process identity service used by the CLI and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use bandmerch_core::{Email, UserId};

use super::{
    Credentials, IdentityError, IdentityService, MIN_PASSWORD_LENGTH, PendingConfirmation,
    Session, SignUpRequest, mask_destination,
};

struct Account {
    email: Email,
    user_id: UserId,
    password: SecretString,
    confirmed: bool,
    code: Option<String>,
}

/// Accounts held in memory, keyed by normalized username.
///
/// Confirmation codes are never delivered anywhere; read them back with
/// [`MemoryIdentity::pending_code`].
#[derive(Default)]
pub struct MemoryIdentity {
    accounts: RwLock<HashMap<String, Account>>,
    fail_next: Mutex<Option<IdentityError>>,
}

impl std::fmt::Debug for MemoryIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryIdentity").finish_non_exhaustive()
    }
}

fn new_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000))
}

fn key(username: &str) -> String {
    username.trim().to_lowercase()
}

impl MemoryIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already confirmed account.
    pub async fn insert_confirmed(&self, email: Email, password: &str) {
        let account = Account {
            user_id: UserId::new(Uuid::new_v4().to_string()),
            email: email.clone(),
            password: SecretString::from(password.to_string()),
            confirmed: true,
            code: None,
        };
        self.accounts
            .write()
            .await
            .insert(email.into_inner(), account);
    }

    /// The code that would have been emailed to `username`.
    pub async fn pending_code(&self, username: &str) -> Option<String> {
        self.accounts
            .read()
            .await
            .get(&key(username))
            .and_then(|a| a.code.clone())
    }

    /// Whether `username` has confirmed their email.
    pub async fn is_confirmed(&self, username: &str) -> bool {
        self.accounts
            .read()
            .await
            .get(&key(username))
            .is_some_and(|a| a.confirmed)
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: IdentityError) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(error);
        }
    }

    fn take_failure(&self) -> Result<(), IdentityError> {
        let pending = self.fail_next.lock().ok().and_then(|mut slot| slot.take());
        pending.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl IdentityService for MemoryIdentity {
    #[instrument(skip_all, fields(username = %credentials.username))]
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, IdentityError> {
        self.take_failure()?;

        let accounts = self.accounts.read().await;
        let account = accounts
            .get(credentials.username.as_str())
            .ok_or(IdentityError::UserNotFound)?;

        if account.password.expose_secret() != credentials.password.expose_secret() {
            return Err(IdentityError::NotAuthorized(
                "Incorrect username or password.".to_string(),
            ));
        }
        if !account.confirmed {
            return Err(IdentityError::UserNotConfirmed);
        }

        info!("signed in");
        Ok(Session {
            username: account.email.clone(),
            user_id: account.user_id.clone(),
            signed_in_at: Utc::now(),
        })
    }

    #[instrument(skip_all, fields(username = %request.username))]
    async fn sign_up(&self, request: &SignUpRequest) -> Result<PendingConfirmation, IdentityError> {
        self.take_failure()?;

        let password = request.password.expose_secret();
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(IdentityError::InvalidPassword(format!(
                "Password did not conform with policy: Password not long enough (minimum {MIN_PASSWORD_LENGTH})"
            )));
        }

        let mut accounts = self.accounts.write().await;
        let username = request.username.as_str();
        if accounts.contains_key(username) {
            return Err(IdentityError::UsernameExists);
        }

        accounts.insert(
            username.to_string(),
            Account {
                email: request.username.clone(),
                user_id: UserId::new(Uuid::new_v4().to_string()),
                password: request.password.clone(),
                confirmed: false,
                code: Some(new_code()),
            },
        );

        info!("account created, confirmation pending");
        Ok(PendingConfirmation {
            username: request.username.clone(),
            destination: mask_destination(&request.username),
        })
    }

    #[instrument(skip(self, code))]
    async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<(), IdentityError> {
        self.take_failure()?;

        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&key(username))
            .ok_or(IdentityError::UserNotFound)?;

        if account.confirmed {
            return Err(IdentityError::NotAuthorized(
                "User cannot be confirmed. Current status is CONFIRMED".to_string(),
            ));
        }
        if account.code.as_deref() != Some(code.trim()) {
            return Err(IdentityError::CodeMismatch);
        }

        account.confirmed = true;
        account.code = None;
        info!("account confirmed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resend_code(&self, username: &str) -> Result<(), IdentityError> {
        self.take_failure()?;

        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&key(username))
            .ok_or(IdentityError::UserNotFound)?;

        if account.confirmed {
            return Err(IdentityError::InvalidParameter(
                "User is already confirmed.".to_string(),
            ));
        }
        account.code = Some(new_code());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_sign_up_confirm_sign_in() {
        let identity = MemoryIdentity::new();
        let request = Credentials::new(email("fan@example.com"), "longenough");

        let pending = identity.sign_up(&request).await.unwrap();
        assert_eq!(pending.destination, "f***@example.com");

        assert!(matches!(
            identity.sign_in(&request).await,
            Err(IdentityError::UserNotConfirmed)
        ));

        let code = identity.pending_code("fan@example.com").await.unwrap();
        assert_eq!(code.len(), 6);
        identity.confirm_sign_up("FAN@example.com", &code).await.unwrap();

        let session = identity.sign_in(&request).await.unwrap();
        assert_eq!(session.username.as_str(), "fan@example.com");
    }

    #[tokio::test]
    async fn test_sign_up_rejects_short_password() {
        let identity = MemoryIdentity::new();
        let request = Credentials::new(email("fan@example.com"), "short");
        assert!(matches!(
            identity.sign_up(&request).await,
            Err(IdentityError::InvalidPassword(_))
        ));
    }

    #[tokio::test]
    async fn test_sign_up_twice_conflicts() {
        let identity = MemoryIdentity::new();
        let request = Credentials::new(email("fan@example.com"), "longenough");
        identity.sign_up(&request).await.unwrap();
        assert!(matches!(
            identity.sign_up(&request).await,
            Err(IdentityError::UsernameExists)
        ));
    }

    #[tokio::test]
    async fn test_sign_in_errors() {
        let identity = MemoryIdentity::new();
        identity
            .insert_confirmed(email("fan@example.com"), "correct-horse")
            .await;

        let wrong = Credentials::new(email("fan@example.com"), "battery-staple");
        assert!(matches!(
            identity.sign_in(&wrong).await,
            Err(IdentityError::NotAuthorized(_))
        ));

        let missing = Credentials::new(email("nobody@example.com"), "correct-horse");
        assert!(matches!(
            identity.sign_in(&missing).await,
            Err(IdentityError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_confirm_with_wrong_code() {
        let identity = MemoryIdentity::new();
        let request = Credentials::new(email("fan@example.com"), "longenough");
        identity.sign_up(&request).await.unwrap();

        let code = identity.pending_code("fan@example.com").await.unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };
        assert!(matches!(
            identity.confirm_sign_up("fan@example.com", wrong).await,
            Err(IdentityError::CodeMismatch)
        ));
        assert!(!identity.is_confirmed("fan@example.com").await);
    }

    #[tokio::test]
    async fn test_resend_after_confirm_is_rejected() {
        let identity = MemoryIdentity::new();
        identity
            .insert_confirmed(email("fan@example.com"), "longenough")
            .await;
        assert!(matches!(
            identity.resend_code("fan@example.com").await,
            Err(IdentityError::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_fail_next() {
        let identity = MemoryIdentity::new();
        identity.fail_next(IdentityError::Network("offline".to_string()));
        assert!(matches!(
            identity.resend_code("x@y.zz").await,
            Err(IdentityError::Network(_))
        ));
        assert!(matches!(
            identity.resend_code("x@y.zz").await,
            Err(IdentityError::UserNotFound)
        ));
    }
}
