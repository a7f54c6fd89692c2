//! Sign-in screen.

use tracing::{info, instrument};

use bandmerch_core::Email;

use crate::navigation::Route;
use crate::notice::{Notice, sign_in_notice};
use crate::screens::{BusyFlag, Outcome};
use crate::services::identity::Credentials;
use crate::state::AppState;

/// Raw sign-in form input.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Check the form before calling the identity service.
    ///
    /// # Errors
    ///
    /// Returns the notice to show for the first failing field.
    pub fn validate(&self) -> Result<Credentials, Notice> {
        if self.email.trim().is_empty() {
            return Err(Notice::info(
                "Email Required",
                "Please enter your email address to continue.",
            ));
        }
        let Ok(email) = Email::parse(&self.email) else {
            return Err(Notice::info(
                "Invalid Email",
                "Please enter a valid email address (e.g., yourname@example.com).",
            ));
        };
        if self.password.trim().is_empty() {
            return Err(Notice::info(
                "Password Required",
                "Please enter your password to sign in.",
            ));
        }
        Ok(Credentials::new(email, &self.password))
    }
}

/// Sign-in screen state.
pub struct LoginScreen {
    state: AppState,
    pub form: LoginForm,
    busy: BusyFlag,
}

impl LoginScreen {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            form: LoginForm::default(),
            busy: BusyFlag::default(),
        }
    }

    /// Whether a sign-in call is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    /// A handle on the in-flight flag that stays readable while
    /// [`submit`](Self::submit) holds the screen.
    #[must_use]
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    /// Validate and sign in. Success clears the history and lands on Home.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Outcome {
        let credentials = match self.form.validate() {
            Ok(credentials) => credentials,
            Err(notice) => return Outcome::Notice(notice),
        };

        let result = {
            let _busy = self.busy.hold();
            self.state.identity().sign_in(&credentials).await
        };

        match result {
            Ok(session) => {
                info!(user_id = %session.user_id, "signed in");
                self.state.set_session(session);
                self.form.password.clear();
                Outcome::reset(Route::Home).with_notice(Notice::info("Success!", "Welcome back!"))
            }
            Err(err) => Outcome::Notice(sign_in_notice(&err, self.state.is_online())),
        }
    }

    /// Placeholder for password recovery, which the service does not offer
    /// through this app yet.
    #[must_use]
    pub fn forgot_password(&self) -> Outcome {
        Outcome::Notice(Notice::info(
            "Forgot Password",
            "Password reset functionality will be implemented soon.",
        ))
    }

    #[must_use]
    pub const fn go_to_sign_up(&self) -> Outcome {
        Outcome::navigate(Route::SignUp)
    }
}
