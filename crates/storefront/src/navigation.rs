//! Named screen destinations and the navigation stack.

use serde::{Deserialize, Serialize};
use tracing::debug;

use bandmerch_core::{Email, ItemId};

use crate::error::add_breadcrumb;

/// A screen and the minimal parameters it needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Route {
    SignIn,
    SignUp,
    /// Confirm the account registered under `username`.
    VerifyEmail { username: Email },
    Home,
    /// A single merchandise listing.
    BandDetail { band_id: ItemId },
    Cart,
    Settings,
}

impl Route {
    /// Title shown in the header.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::SignIn => "Sign In",
            Self::SignUp => "Sign Up",
            Self::VerifyEmail { .. } => "Verify Email",
            Self::Home => "Bands",
            Self::BandDetail { .. } => "Band",
            Self::Cart => "Cart",
            Self::Settings => "Settings",
        }
    }
}

/// A stack of visited routes. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::SignIn)
    }
}

impl Navigator {
    #[must_use]
    pub fn new(initial: Route) -> Self {
        Self {
            stack: vec![initial],
        }
    }

    #[must_use]
    pub fn current(&self) -> &Route {
        // The stack always holds the root route.
        self.stack.last().unwrap_or(&Route::SignIn)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Go to `route`. Navigating to the current route is a no-op.
    pub fn navigate(&mut self, route: Route) {
        if self.current() == &route {
            return;
        }
        debug!(from = ?self.current(), to = ?route, "navigate");
        add_breadcrumb("navigation", route.title(), None);
        self.stack.push(route);
    }

    /// Pop the current route. Returns `false` at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        true
    }

    /// Replace the whole stack with `route` (e.g. after signing in).
    pub fn reset(&mut self, route: Route) {
        self.stack.clear();
        self.stack.push(route);
    }
}
