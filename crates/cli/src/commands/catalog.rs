//! Catalog listing.
//!
//! # Usage
//!
//! ```bash
//! # All listings
//! bandmerch catalog
//!
//! # One band, as JSON
//! bandmerch catalog --band "The Static" --json
//! ```

use std::io::Write;

use bandmerch_storefront::AppState;
use bandmerch_storefront::models::Band;
use bandmerch_storefront::services::sync::{Predicate, dedupe_by_id};

use super::CommandError;

/// Bands in the catalog, deduplicated, optionally filtered by band name
/// (case-insensitive).
///
/// # Errors
///
/// Returns an error if the band collection cannot be queried.
pub async fn list(state: &AppState, band: Option<&str>) -> Result<Vec<Band>, CommandError> {
    let predicate = band.map_or_else(Predicate::all, |name| {
        let name = name.trim().to_lowercase();
        Predicate::new(move |b: &Band| b.band.to_lowercase() == name)
    });
    let found = state
        .bands()
        .query(&predicate)
        .await
        .map_err(bandmerch_storefront::AppError::from)?;
    Ok(dedupe_by_id(found))
}

/// Print the catalog.
///
/// # Errors
///
/// Returns an error if the query or the write fails.
pub async fn run(
    state: &AppState,
    band: Option<&str>,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let bands = list(state, band).await?;
    tracing::info!(count = bands.len(), "catalog listed");

    if json {
        serde_json::to_writer_pretty(&mut *out, &bands)?;
        writeln!(out)?;
        return Ok(());
    }

    if bands.is_empty() {
        writeln!(out, "No bands found.")?;
        return Ok(());
    }
    for band in &bands {
        writeln!(
            out,
            "{:<10} {} - {} ({})",
            band.id.as_str(),
            band.band,
            band.item,
            band.price_label()
        )?;
    }
    Ok(())
}
