//! Build a cart from item ids and print it.
//!
//! # Usage
//!
//! ```bash
//! # Two shirts and a poster
//! bandmerch cart demo-1 demo-1 demo-4
//! ```

use std::io::Write;

use bandmerch_core::ItemId;
use bandmerch_storefront::AppState;
use bandmerch_storefront::screens::{BandScreen, CartScreen, CartView, Outcome};

use super::CommandError;

/// Add one unit per id, in order. Unknown or unpriced ids are skipped with a
/// warning.
///
/// # Errors
///
/// Returns an error if the band collection cannot be queried.
pub async fn fill(state: &AppState, item_ids: &[String]) -> Result<CartView, CommandError> {
    for raw in item_ids {
        let id = ItemId::new(raw.trim());
        match BandScreen::open(state.clone(), &id).await {
            Ok(screen) => {
                if let Outcome::Notice(notice) = screen.add_to_cart() {
                    tracing::warn!(item_id = %id, reason = %notice.message, "skipped item");
                }
            }
            Err(bandmerch_storefront::AppError::NotFound(_)) => {
                tracing::warn!(item_id = %id, "no such item");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(CartScreen::new(state.clone()).view())
}

/// Print the cart.
///
/// # Errors
///
/// Returns an error if the query or the write fails.
pub async fn run(
    state: &AppState,
    item_ids: &[String],
    json: bool,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let view = fill(state, item_ids).await?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &view)?;
        writeln!(out)?;
        return Ok(());
    }

    if view.is_empty() {
        writeln!(out, "Your cart is empty.")?;
        return Ok(());
    }
    for line in &view.lines {
        let band = line.band.as_deref().unwrap_or("-");
        writeln!(
            out,
            "{band} / {} - {} x {} = {}",
            line.name, line.quantity, line.unit_price, line.subtotal
        )?;
    }
    writeln!(out, "Items: {}", view.item_count)?;
    writeln!(out, "Total: {}", view.total)?;
    Ok(())
}
