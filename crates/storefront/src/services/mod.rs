//! Collaborators provided by the managed backend and the device.
//!
//! # Services
//!
//! - `identity` - Sign-up, sign-in and email confirmation
//! - `sync` - Local-first synced collections with change subscriptions
//! - `preferences` - Device-local key-value storage
//!
//! Each is a trait with an in-memory implementation; the backend's own
//! retry, merge and token handling stay behind these seams.

pub mod identity;
pub mod preferences;
pub mod sync;
