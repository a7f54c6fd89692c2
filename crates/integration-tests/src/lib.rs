//! Integration tests for the band merch storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bandmerch-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Browsing, adding to the cart and editing it through screens
//! - `auth_flow` - Sign-up, confirmation and sign-in against the in-memory identity service
//! - `catalog_sync` - Live listing updates, duplicates and unsubscribe
//! - `preferences` - Theme persistence in the JSON preference file
//!
//! Everything runs against the in-memory collaborators; no network access.

use std::path::PathBuf;
use std::sync::Arc;

use bandmerch_storefront::catalog::demo_catalog;
use bandmerch_storefront::config::StorefrontConfig;
use bandmerch_storefront::models::{Band, UserProfile};
use bandmerch_storefront::services::identity::MemoryIdentity;
use bandmerch_storefront::services::preferences::{MemoryPreferences, PreferenceStore};
use bandmerch_storefront::services::sync::MemoryCollection;
use bandmerch_storefront::{AppState, Collaborators};

/// App state wired to in-memory collaborators, with handles kept for
/// inspection and fault injection.
pub struct TestContext {
    pub state: AppState,
    pub identity: Arc<MemoryIdentity>,
    pub bands: Arc<MemoryCollection<Band>>,
    pub users: Arc<MemoryCollection<UserProfile>>,
}

impl TestContext {
    /// Context seeded with the demo catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(demo_catalog())
    }

    #[must_use]
    pub fn with_catalog(catalog: Vec<Band>) -> Self {
        Self::with_preferences(catalog, Arc::new(MemoryPreferences::new()))
    }

    #[must_use]
    pub fn with_preferences(catalog: Vec<Band>, preferences: Arc<dyn PreferenceStore>) -> Self {
        let identity = Arc::new(MemoryIdentity::new());
        let bands = Arc::new(MemoryCollection::with_records(catalog));
        let users = Arc::new(MemoryCollection::new());
        let collaborators = Collaborators {
            identity: identity.clone(),
            bands: bands.clone(),
            users: users.clone(),
            preferences,
        };

        Self {
            state: AppState::new(StorefrontConfig::default(), collaborators),
            identity,
            bands,
            users,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A unique path in the temp directory for a throwaway file.
#[must_use]
pub fn temp_file(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{prefix}-{}.json", uuid::Uuid::new_v4()))
}
