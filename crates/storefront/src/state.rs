//! Application state shared across screens.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

use crate::cart::CartStore;
use crate::catalog::{demo_catalog, load_catalog};
use crate::config::StorefrontConfig;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::models::{Band, UserProfile};
use crate::services::identity::{IdentityService, MemoryIdentity, Session};
use crate::services::preferences::{JsonFilePreferences, MemoryPreferences, PreferenceStore};
use crate::services::sync::{MemoryCollection, SyncedCollection};

/// The backend-facing collaborators the app talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityService>,
    pub bands: Arc<dyn SyncedCollection<Band>>,
    pub users: Arc<dyn SyncedCollection<UserProfile>>,
    pub preferences: Arc<dyn PreferenceStore>,
}

impl Collaborators {
    /// In-process collaborators seeded with `catalog`.
    #[must_use]
    pub fn in_memory(catalog: Vec<Band>) -> Self {
        Self {
            identity: Arc::new(MemoryIdentity::new()),
            bands: Arc::new(MemoryCollection::with_records(catalog)),
            users: Arc::new(MemoryCollection::<UserProfile>::new()),
            preferences: Arc::new(MemoryPreferences::new()),
        }
    }
}

/// Application state shared across all screens.
///
/// This struct is cheaply cloneable via `Arc`. It owns the single cart for
/// the app instance.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    collaborators: Collaborators,
    cart: CartStore,
    session: watch::Sender<Option<Session>>,
    pending_profile: Mutex<Option<UserProfile>>,
    online: AtomicBool,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, collaborators: Collaborators) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                collaborators,
                cart: CartStore::new(),
                session,
                pending_profile: Mutex::new(None),
                online: AtomicBool::new(true),
            }),
        }
    }

    /// Build state from configuration: catalog from `BANDMERCH_CATALOG_PATH`
    /// (or the demo set) and preferences in the configured JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured catalog file cannot be loaded.
    pub async fn from_config(config: StorefrontConfig) -> Result<Self, AppError> {
        let catalog = match &config.catalog_path {
            Some(path) => load_catalog(path).await?,
            None => demo_catalog(),
        };

        if config.backend.is_remote() {
            warn!(
                endpoint = ?config.backend.endpoint.as_ref().map(url::Url::as_str),
                has_api_key = config.backend.api_key().is_some(),
                "no remote backend adapter is built in; using in-memory collaborators"
            );
        }

        let collaborators = Collaborators {
            preferences: Arc::new(JsonFilePreferences::new(&config.preferences_path)),
            ..Collaborators::in_memory(catalog)
        };
        info!(preferences = %config.preferences_path.display(), "app state ready");

        Ok(Self::new(config, collaborators))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The app-wide cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn identity(&self) -> &Arc<dyn IdentityService> {
        &self.inner.collaborators.identity
    }

    #[must_use]
    pub fn bands(&self) -> &Arc<dyn SyncedCollection<Band>> {
        &self.inner.collaborators.bands
    }

    #[must_use]
    pub fn users(&self) -> &Arc<dyn SyncedCollection<UserProfile>> {
        &self.inner.collaborators.users
    }

    #[must_use]
    pub fn preferences(&self) -> &Arc<dyn PreferenceStore> {
        &self.inner.collaborators.preferences
    }

    /// The signed-in session, if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.inner.session.borrow().clone()
    }

    pub(crate) fn set_session(&self, session: Session) {
        set_sentry_user(&session.user_id, Some(session.username.as_str()));
        self.inner.session.send_replace(Some(session));
    }

    /// Forget the signed-in session. The cart is left as is.
    pub fn sign_out(&self) {
        clear_sentry_user();
        self.inner.session.send_replace(None);
    }

    /// Remember the profile entered at sign-up until the email is confirmed.
    pub(crate) async fn stash_profile(&self, profile: UserProfile) {
        *self.inner.pending_profile.lock().await = Some(profile);
    }

    /// Take the stashed profile if it belongs to `email`.
    pub(crate) async fn take_profile(&self, email: &str) -> Option<UserProfile> {
        let mut slot = self.inner.pending_profile.lock().await;
        if slot.as_ref().is_some_and(|p| p.email.as_str() == email) {
            slot.take()
        } else {
            None
        }
    }

    /// Whether the device currently has connectivity.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::Relaxed)
    }

    pub fn set_online(&self, online: bool) {
        self.inner.online.store(online, Ordering::Relaxed);
    }
}
