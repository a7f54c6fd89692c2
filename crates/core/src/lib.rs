//! Band merch core - Shared types library.
//!
//! This crate provides common types used across the band merch components:
//! - `storefront` - Cart store, synced collections, screen controllers
//! - `cli` - Command-line driver for the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no backend access,
//! no async runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, roles and themes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
