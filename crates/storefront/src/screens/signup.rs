//! Account registration screen.
//!
//! Sign-up checks for an existing profile, registers the account with the
//! identity service, and stashes the profile draft until the email is
//! confirmed on the verify screen.

use tracing::{info, instrument};

use bandmerch_core::{Email, UserRole};

use crate::error::AppError;
use crate::models::UserProfile;
use crate::navigation::Route;
use crate::notice::{Notice, account_exists, sign_up_notice};
use crate::screens::{BusyFlag, Outcome};
use crate::services::identity::{Credentials, MIN_PASSWORD_LENGTH};
use crate::services::sync::Predicate;
use crate::state::AppState;

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Raw sign-up form input.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub username: String,
    pub role: UserRole,
}

impl SignupForm {
    /// Check the form before calling any collaborator.
    ///
    /// # Errors
    ///
    /// Returns the notice to show for the first failing field.
    pub fn validate(&self) -> Result<(Credentials, UserProfile), Notice> {
        if self.email.trim().is_empty() {
            return Err(Notice::info(
                "Email Required",
                "Please enter your email address to create your account.",
            ));
        }
        let Ok(email) = Email::parse(&self.email) else {
            return Err(Notice::info(
                "Invalid Email",
                "Please enter a valid email address (e.g., yourname@example.com).",
            ));
        };
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Notice::info(
                "Password Too Short",
                "Your password must be at least 8 characters long for security.",
            ));
        }
        if self.password != self.confirm {
            return Err(Notice::info(
                "Passwords Don't Match",
                "Please make sure both password fields are identical.",
            ));
        }
        let username = self.username.trim();
        if username.is_empty() {
            return Err(Notice::info(
                "Username Required",
                "Please choose a username for your profile.",
            ));
        }
        if username.chars().count() < MIN_USERNAME_LENGTH {
            return Err(Notice::info(
                "Username Too Short",
                "Your username must be at least 3 characters long.",
            ));
        }

        let profile = UserProfile::new(email.clone(), username, self.role);
        Ok((Credentials::new(email, &self.password), profile))
    }
}

/// Sign-up screen state.
pub struct SignupScreen {
    state: AppState,
    pub form: SignupForm,
    busy: BusyFlag,
}

impl SignupScreen {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            form: SignupForm::default(),
            busy: BusyFlag::default(),
        }
    }

    /// Set while the account check or registration is in flight.
    #[must_use]
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    /// Roles offered by the role picker.
    #[must_use]
    pub const fn roles() -> [UserRole; 2] {
        UserRole::ALL
    }

    /// Validate, check for an existing profile, and register.
    #[instrument(skip(self), fields(role = %self.form.role))]
    pub async fn submit(&mut self) -> Outcome {
        let (request, profile) = match self.form.validate() {
            Ok(valid) => valid,
            Err(notice) => return Outcome::Notice(notice),
        };
        let online = self.state.is_online();
        let busy = self.busy.hold();

        let email = request.username.clone();
        let existing = self
            .state
            .users()
            .query(&Predicate::new(move |u: &UserProfile| u.email == email))
            .await;
        match existing {
            Ok(found) if !found.is_empty() => return Outcome::Notice(account_exists()),
            Ok(_) => {}
            Err(err) => {
                return Outcome::Notice(
                    AppError::from(err).to_notice("checking your account", online),
                );
            }
        }

        let pending = match self.state.identity().sign_up(&request).await {
            Ok(pending) => pending,
            Err(err) => return Outcome::Notice(sign_up_notice(&err, online)),
        };
        drop(busy);

        info!(destination = %pending.destination, "sign-up pending confirmation");
        self.state.stash_profile(profile).await;
        self.form.password.clear();
        self.form.confirm.clear();

        Outcome::navigate(Route::VerifyEmail {
            username: pending.username,
        })
        .with_notice(Notice::info(
            "Check Your Email",
            format!("We sent a verification code to {}.", pending.destination),
        ))
    }

    #[must_use]
    pub const fn go_to_sign_in(&self) -> Outcome {
        Outcome::navigate(Route::SignIn)
    }
}
