//! Single listing with add-to-cart.

use tracing::instrument;

use bandmerch_core::ItemId;

use crate::cart::CartItem;
use crate::error::{AppError, add_breadcrumb};
use crate::models::Band;
use crate::notice::Notice;
use crate::screens::Outcome;
use crate::services::sync::{Predicate, dedupe_by_id};
use crate::state::AppState;

/// Band detail screen state.
pub struct BandScreen {
    state: AppState,
    band: Band,
}

impl BandScreen {
    /// Show a listing already in hand (e.g. selected from Home).
    #[must_use]
    pub const fn new(state: AppState, band: Band) -> Self {
        Self { state, band }
    }

    /// Look the listing up by id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no listing has the id, or the
    /// collection error.
    #[instrument(skip(state))]
    pub async fn open(state: AppState, band_id: &ItemId) -> Result<Self, AppError> {
        let wanted = band_id.clone();
        let found = state
            .bands()
            .query(&Predicate::new(move |b: &Band| b.id == wanted))
            .await?;
        let band = dedupe_by_id(found)
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Band {band_id}")))?;
        Ok(Self::new(state, band))
    }

    #[must_use]
    pub const fn band(&self) -> &Band {
        &self.band
    }

    #[must_use]
    pub fn price_label(&self) -> String {
        self.band.price_label()
    }

    /// Units of this listing already in the cart.
    #[must_use]
    pub fn in_cart(&self) -> u32 {
        self.state
            .cart()
            .line(self.band.id.as_str())
            .map_or(0, |line| line.quantity())
    }

    /// Add one unit to the cart.
    ///
    /// Listings without a price cannot be bought; the cart would ignore them.
    pub fn add_to_cart(&self) -> Outcome {
        if self.band.price.is_none_or(|p| !p.is_finite() || p < 0.0) {
            return Outcome::Notice(Notice::info(
                "Price Unavailable",
                "This item can't be added to your cart right now.",
            ));
        }
        self.state.cart().add_item(&CartItem::from(&self.band));
        add_breadcrumb(
            "cart",
            "Added item",
            Some(&[("item_id", self.band.id.as_str())]),
        );
        Outcome::Stay
    }
}
