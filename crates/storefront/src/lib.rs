//! Band merch storefront library.
//!
//! The headless core of the band merchandise app: the client-side cart,
//! synced catalog and profile collections, accounts, theme preference, and
//! the screen controllers that tie them together. Hosts render the views and
//! notices these produce.
//!
//! # Architecture
//!
//! - [`cart::CartStore`] - Keyed cart with `watch`-published snapshots
//! - [`services`] - Identity, synced collection and preference collaborators
//! - [`screens`] - Per-screen controllers returning [`screens::Outcome`]s
//! - [`notice`] - Failure taxonomy and user-facing messages
//! - [`state::AppState`] - Shared handle on all of the above

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod notice;
pub mod screens;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod theme;

pub use cart::{CartItem, CartLine, CartSnapshot, CartStore};
pub use error::{AppError, Result};
pub use state::{AppState, Collaborators};
