//! Records held by the synced collection store.

pub mod band;
pub mod user;

pub use band::Band;
pub use user::UserProfile;
