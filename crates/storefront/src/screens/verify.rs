//! Email confirmation screen.

use tracing::{info, instrument, warn};

use bandmerch_core::{Email, UserRole};

use crate::error::report;
use crate::models::UserProfile;
use crate::navigation::Route;
use crate::notice::{ErrorKind, Notice, verify_notice};
use crate::screens::{BusyFlag, Outcome};
use crate::services::sync::Predicate;
use crate::state::AppState;

/// Number of digits in a confirmation code.
pub const CODE_LENGTH: usize = 6;

/// Confirmation screen for the account registered under `username`.
pub struct VerifyScreen {
    state: AppState,
    username: Option<Email>,
    pub code: String,
    busy: BusyFlag,
}

impl VerifyScreen {
    /// `username` is `None` when the screen was reached without one; every
    /// action then asks the user to sign up again.
    #[must_use]
    pub fn new(state: AppState, username: Option<Email>) -> Self {
        Self {
            state,
            username,
            code: String::new(),
            busy: BusyFlag::default(),
        }
    }

    /// Set while a confirm or resend call is in flight.
    #[must_use]
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    #[must_use]
    pub const fn username(&self) -> Option<&Email> {
        self.username.as_ref()
    }

    fn valid_code(&self) -> Option<&str> {
        let code = self.code.trim();
        (code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())).then_some(code)
    }

    /// Confirm the account, create its profile, and return to sign-in.
    #[instrument(skip(self), fields(username = ?self.username))]
    pub async fn submit(&mut self) -> Outcome {
        let Some(username) = self.username.clone() else {
            return Outcome::Notice(Notice::info(
                "Error",
                "Unable to verify your email. Please try signing up again.",
            ));
        };
        let Some(code) = self.valid_code() else {
            return Outcome::Notice(Notice::info(
                "Invalid Code",
                "Please enter the 6-digit verification code.",
            ));
        };

        let confirmed = {
            let _busy = self.busy.hold();
            self.state
                .identity()
                .confirm_sign_up(username.as_str(), code)
                .await
        };
        if let Err(err) = confirmed {
            return Outcome::Notice(verify_notice(&err));
        }
        info!("email confirmed");
        self.code.clear();

        self.ensure_profile(username).await;

        Outcome::reset(Route::SignIn).with_notice(Notice::info(
            "Email Verified!",
            "Your email has been successfully verified. You can now log in.",
        ))
    }

    /// Save the stashed profile unless one already exists for the email.
    ///
    /// The account is confirmed at this point, so a failure here is logged
    /// and does not block sign-in.
    async fn ensure_profile(&self, username: Email) {
        let users = self.state.users();
        let email = username.clone();
        match users
            .query(&Predicate::new(move |u: &UserProfile| u.email == email))
            .await
        {
            Ok(found) if !found.is_empty() => return,
            Ok(_) => {}
            Err(err) => {
                report(&err, ErrorKind::from(&err), "profile lookup");
                return;
            }
        }

        let profile = match self.state.take_profile(username.as_str()).await {
            Some(profile) => profile,
            None => {
                warn!("no profile draft for confirmed account; saving defaults");
                UserProfile::new(username, "", UserRole::default())
            }
        };
        if let Err(err) = users.save(profile).await {
            report(&err, ErrorKind::from(&err), "profile creation");
        }
    }

    /// Ask for a new code.
    #[instrument(skip(self), fields(username = ?self.username))]
    pub async fn resend(&self) -> Outcome {
        let Some(username) = &self.username else {
            return Outcome::Notice(Notice::info(
                "Error",
                "Unable to resend code. Please try signing up again.",
            ));
        };

        let resent = {
            let _busy = self.busy.hold();
            self.state.identity().resend_code(username.as_str()).await
        };
        match resent {
            Ok(()) => Outcome::Notice(Notice::info(
                "Code Resent",
                "A new verification code has been sent to your email address.",
            )),
            Err(err) => Outcome::Notice(verify_notice(&err)),
        }
    }

    /// Confirmation prompt before abandoning verification.
    #[must_use]
    pub fn cancel(&self) -> Outcome {
        Outcome::Notice(
            Notice::info(
                "Cancel Verification",
                "Are you sure you want to go back? You'll need to verify your email to complete account creation.",
            )
            .with_action("Go Back", Route::SignUp),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::screens::test_support::{Harness, harness, stalled_state, wait_until_set};
    use crate::screens::{SignupForm, SignupScreen};
    use crate::services::identity::IdentityError;
    use crate::services::sync::SyncedCollection;

    async fn registered(h: &Harness) -> Email {
        let mut signup = SignupScreen::new(h.state.clone());
        signup.form = SignupForm {
            email: "fan@example.com".to_string(),
            password: "hunter222".to_string(),
            confirm: "hunter222".to_string(),
            username: "rocker".to_string(),
            role: UserRole::Band,
        };
        signup.submit().await;
        Email::parse("fan@example.com").unwrap()
    }

    #[tokio::test]
    async fn test_rejects_malformed_code() {
        let h = harness();
        let email = registered(&h).await;
        let mut screen = VerifyScreen::new(h.state.clone(), Some(email));

        for code in ["123", "12345a", "1234567", ""] {
            screen.code = code.to_string();
            let outcome = screen.submit().await;
            assert_eq!(outcome.notice().unwrap().message, "Please enter the 6-digit verification code.");
        }
    }

    #[tokio::test]
    async fn test_confirm_creates_profile() {
        let h = harness();
        let email = registered(&h).await;
        let code = h.identity.pending_code(email.as_str()).await.unwrap();

        let mut screen = VerifyScreen::new(h.state.clone(), Some(email.clone()));
        screen.code = format!(" {code} ");
        let outcome = screen.submit().await;

        assert_eq!(
            outcome,
            Outcome::reset(Route::SignIn).with_notice(Notice::info(
                "Email Verified!",
                "Your email has been successfully verified. You can now log in.",
            ))
        );
        assert!(h.identity.is_confirmed(email.as_str()).await);

        let profiles = h.users.query(&Predicate::all()).await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].username.as_deref(), Some("rocker"));
        assert_eq!(profiles[0].role, UserRole::Band);
        assert!(!profiles[0].id.is_blank());
    }

    #[tokio::test]
    async fn test_wrong_code() {
        let h = harness();
        let email = registered(&h).await;
        let real = h.identity.pending_code(email.as_str()).await.unwrap();
        let wrong = if real == "000000" { "111111" } else { "000000" };

        let mut screen = VerifyScreen::new(h.state.clone(), Some(email));
        screen.code = wrong.to_string();
        let notice = screen.submit().await.notice().cloned().unwrap();
        assert_eq!(notice.title, "Invalid Code");
        assert_eq!(
            notice.message,
            "The verification code you entered is incorrect. Please try again."
        );
        assert!(h.users.is_empty());
    }

    #[tokio::test]
    async fn test_resend() {
        let h = harness();
        let email = registered(&h).await;
        let screen = VerifyScreen::new(h.state.clone(), Some(email));

        assert_eq!(screen.resend().await.notice().unwrap().title, "Code Resent");

        h.identity
            .fail_next(IdentityError::Network("network down".to_string()));
        let notice = screen.resend().await.notice().cloned().unwrap();
        assert_eq!(notice.title, "Connection Problem");
        assert_eq!(
            notice.message,
            "Please check your internet connection and try again."
        );
    }

    #[tokio::test]
    async fn test_missing_username() {
        let h = harness();
        let mut screen = VerifyScreen::new(h.state.clone(), None);
        screen.code = "123456".to_string();
        assert_eq!(screen.submit().await.notice().unwrap().title, "Error");
        assert_eq!(
            screen.resend().await.notice().unwrap().message,
            "Unable to resend code. Please try signing up again."
        );
    }

    #[test]
    fn test_cancel_offers_way_back() {
        let h = harness();
        let screen = VerifyScreen::new(h.state, None);
        let outcome = screen.cancel();
        let notice = outcome.notice().unwrap();
        assert_eq!(notice.title, "Cancel Verification");
        assert_eq!(notice.actions[0].route, Route::SignUp);
    }

    #[tokio::test]
    async fn test_busy_while_confirming_and_after_cancel() {
        let username = Email::parse("fan@example.com").unwrap();
        let mut screen = VerifyScreen::new(stalled_state(), Some(username));
        screen.code = "123456".to_string();
        let busy = screen.busy_flag();

        let task = tokio::spawn(async move { screen.submit().await });
        wait_until_set(&busy).await;

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(!busy.is_set());
    }
}
