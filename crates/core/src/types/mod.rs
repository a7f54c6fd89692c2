//! Core types for the band merch storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod role;
pub mod theme;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use role::{ParseRoleError, UserRole};
pub use theme::{ParseThemeError, ThemePreference};
