//! Screen controllers.
//!
//! Each screen is a plain struct holding its form or view state. Actions call
//! the collaborators through [`AppState`](crate::state::AppState) and return an
//! [`Outcome`] for the host to render.
//!
//! # Screens
//!
//! - `login` - Email and password sign-in
//! - `signup` - Account registration and profile draft
//! - `verify` - Email confirmation code entry
//! - `home` - Live band listing
//! - `band` - Single listing with add-to-cart
//! - `cart` - Cart lines, quantities and total
//! - `settings` - Theme choice and sign-out

pub mod band;
pub mod cart;
pub mod home;
pub mod login;
pub mod settings;
pub mod signup;
pub mod verify;

pub use band::BandScreen;
pub use cart::{CartLineView, CartScreen, CartView};
pub use home::{HomeScreen, Listing};
pub use login::{LoginForm, LoginScreen};
pub use settings::{SettingsScreen, ThemeOption};
pub use signup::{SignupForm, SignupScreen};
pub use verify::VerifyScreen;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::navigation::{Navigator, Route};
use crate::notice::Notice;

/// Set while a screen is waiting on the identity service.
///
/// Clones share the flag, so a host can hold one and poll it to disable
/// controls while the screen's action is awaited elsewhere.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raise the flag until the guard is dropped, including when the
    /// awaiting future is cancelled.
    pub(crate) fn hold(&self) -> BusyGuard {
        self.0.store(true, Ordering::Release);
        BusyGuard(Arc::clone(&self.0))
    }
}

#[must_use]
pub(crate) struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// What the host should do after a screen action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to show.
    Stay,
    /// Show a blocking notice and stay on the screen.
    Notice(Notice),
    /// Move to `route`, optionally after a notice is dismissed.
    Go {
        route: Route,
        notice: Option<Notice>,
        /// Drop the history (entering or leaving the signed-in area).
        clear_history: bool,
    },
}

impl Outcome {
    #[must_use]
    pub const fn navigate(route: Route) -> Self {
        Self::Go {
            route,
            notice: None,
            clear_history: false,
        }
    }

    #[must_use]
    pub const fn reset(route: Route) -> Self {
        Self::Go {
            route,
            notice: None,
            clear_history: true,
        }
    }

    /// Attach a notice shown before navigating.
    #[must_use]
    pub fn with_notice(self, notice: Notice) -> Self {
        match self {
            Self::Go {
                route,
                clear_history,
                ..
            } => Self::Go {
                route,
                notice: Some(notice),
                clear_history,
            },
            Self::Stay | Self::Notice(_) => Self::Notice(notice),
        }
    }

    /// The notice to show, if any.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        match self {
            Self::Notice(notice)
            | Self::Go {
                notice: Some(notice),
                ..
            } => Some(notice),
            _ => None,
        }
    }

    /// Apply the navigation part to `nav`, returning the notice to show.
    pub fn apply(self, nav: &mut Navigator) -> Option<Notice> {
        match self {
            Self::Stay => None,
            Self::Notice(notice) => Some(notice),
            Self::Go {
                route,
                notice,
                clear_history,
            } => {
                if clear_history {
                    nav.reset(route);
                } else {
                    nav.navigate(route);
                }
                notice
            }
        }
    }
}
