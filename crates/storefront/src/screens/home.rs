//! Live band listing.
//!
//! The screen observes the band collection for as long as it is open. The
//! sync engine may deliver the same record twice in one snapshot, so every
//! snapshot is deduplicated by id before display.

use tracing::{debug, instrument};

use bandmerch_core::ItemId;

use crate::models::Band;
use crate::navigation::Route;
use crate::notice::data_message;
use crate::screens::Outcome;
use crate::services::sync::{Predicate, Snapshot, Subscription, dedupe_by_id};
use crate::state::AppState;

/// What the listing currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    /// No snapshot has arrived yet.
    Loading,
    /// A snapshot arrived with no bands.
    Empty,
    Loaded(Vec<Band>),
    /// Observing failed; the message is shown in place of the list.
    Failed(String),
}

/// Home screen state.
pub struct HomeScreen {
    subscription: Option<Subscription<Band>>,
    listing: Listing,
}

impl HomeScreen {
    /// Start observing all bands.
    #[instrument(skip(state))]
    pub async fn open(state: &AppState) -> Self {
        match state.bands().observe(Predicate::all()).await {
            Ok(subscription) => Self {
                subscription: Some(subscription),
                listing: Listing::Loading,
            },
            Err(err) => Self {
                subscription: None,
                listing: Listing::Failed(data_message(&err, "loading bands")),
            },
        }
    }

    #[must_use]
    pub const fn listing(&self) -> &Listing {
        &self.listing
    }

    /// Bands currently shown, empty unless loaded.
    #[must_use]
    pub fn bands(&self) -> &[Band] {
        match &self.listing {
            Listing::Loaded(bands) => bands,
            _ => &[],
        }
    }

    /// Whether the screen still receives updates.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    fn apply(&mut self, snapshot: Snapshot<Band>) {
        let bands = dedupe_by_id(snapshot.items);
        debug!(count = bands.len(), "band snapshot");
        self.listing = if bands.is_empty() {
            Listing::Empty
        } else {
            Listing::Loaded(bands)
        };
    }

    /// Wait for the next snapshot and show it.
    ///
    /// Returns `false` once the source has gone away; the last listing stays.
    pub async fn refresh(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        let next = subscription.next().await;
        match next {
            Some(snapshot) => {
                self.apply(snapshot);
                true
            }
            None => {
                self.subscription = None;
                false
            }
        }
    }

    /// Show the newest snapshot already delivered, without waiting.
    ///
    /// Returns how many snapshots were consumed.
    pub fn poll(&mut self) -> usize {
        let mut latest = None;
        let mut consumed = 0;
        if let Some(subscription) = self.subscription.as_mut() {
            while let Some(snapshot) = subscription.try_next() {
                latest = Some(snapshot);
                consumed += 1;
            }
        }
        if let Some(snapshot) = latest {
            self.apply(snapshot);
        }
        consumed
    }

    /// Open the detail screen for a listed band.
    #[must_use]
    pub fn select(&self, band_id: &ItemId) -> Outcome {
        if self.bands().iter().any(|b| &b.id == band_id) {
            Outcome::navigate(Route::BandDetail {
                band_id: band_id.clone(),
            })
        } else {
            Outcome::Stay
        }
    }

    /// Stop observing. The listing is kept for display.
    pub async fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe().await;
        }
    }
}
