//! Catalog seed data.
//!
//! The in-memory band collection starts from either a JSON file (an array of
//! [`Band`] records in the backend's shape) or a small built-in set.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::models::Band;

/// Errors loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog is not a JSON array of bands: {0}")]
    Format(#[from] serde_json::Error),
}

/// Load bands from a JSON file.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read or parsed.
pub async fn load_catalog(path: &Path) -> Result<Vec<Band>, CatalogError> {
    let bytes = tokio::fs::read(path).await?;
    let bands: Vec<Band> = serde_json::from_slice(&bytes)?;
    info!(path = %path.display(), count = bands.len(), "catalog loaded");
    Ok(bands)
}

/// A handful of listings for running without a catalog file.
#[must_use]
pub fn demo_catalog() -> Vec<Band> {
    let mut shirt = Band::new("demo-1", "The Static", "Tour Shirt", 29.99);
    shirt.desc = Some("Black cotton tee with the 2024 tour dates on the back.".to_string());

    let mut vinyl = Band::new("demo-2", "The Static", "Signal Loss LP", 24.0);
    vinyl.desc = Some("180g vinyl, gatefold sleeve.".to_string());

    let mut hoodie = Band::new("demo-3", "Night Ferry", "Harbor Hoodie", 54.5);
    hoodie.desc = Some("Heavyweight pullover hoodie.".to_string());

    let mut poster = Band::new("demo-4", "Night Ferry", "Gig Poster", 12.0);
    poster.image = Some("https://cdn.bandmerch.test/night-ferry/poster.jpg".to_string());

    let mut patch = Band::new("demo-5", "Lowlands", "Embroidered Patch", 6.5);
    patch.price = None;

    vec![shirt, vinyl, hoodie, poster, patch]
}
