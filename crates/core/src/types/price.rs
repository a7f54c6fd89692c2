//! Price representation.
//!
//! Prices arrive from the synced store as plain floating-point numbers and
//! are multiplied and summed as such. No currency-rounding policy is applied
//! to arithmetic; rounding to cents only happens when formatting for display.

use core::fmt;
use core::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// A price in the store's single display currency (USD).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(0.0);

    /// Create a new price from a raw amount.
    #[must_use]
    pub const fn new(amount: f64) -> Self {
        Self(amount)
    }

    /// Get the raw amount.
    #[must_use]
    pub const fn amount(self) -> f64 {
        self.0
    }

    /// Whether this amount can be charged: finite and not negative.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(self) -> String {
        format!("${:.2}", self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl From<f64> for Price {
    fn from(amount: f64) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * f64::from(quantity))
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
