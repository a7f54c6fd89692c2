//! Band merchandise listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bandmerch_core::{ItemId, Price};

use crate::services::sync::Record;

/// One merchandise listing published by a band.
///
/// Each listing is a single purchasable item; a band with several items has
/// several listings sharing the same `band` name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    pub id: ItemId,
    /// Band name.
    pub band: String,
    /// Merchandise name.
    pub item: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Band {
    /// Create a listing with a price and no optional metadata.
    #[must_use]
    pub fn new(
        id: impl Into<ItemId>,
        band: impl Into<String>,
        item: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            band: band.into(),
            item: item.into(),
            price: Some(price),
            desc: None,
            image: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Price for display, or "Price unavailable".
    #[must_use]
    pub fn price_label(&self) -> String {
        self.price
            .map_or_else(|| "Price unavailable".to_string(), |p| Price::new(p).display())
    }
}

impl Record for Band {
    fn id(&self) -> &ItemId {
        &self.id
    }

    fn assign_id(&mut self, id: ItemId) {
        self.id = id;
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.created_at.get_or_insert(now);
        self.updated_at = Some(now);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_shape() {
        let json = r#"{
            "id": "b1",
            "band": "The Static",
            "item": "Tour Shirt",
            "price": 29.99,
            "createdAt": "2024-05-01T12:00:00Z"
        }"#;
        let band: Band = serde_json::from_str(json).unwrap();
        assert_eq!(band.id.as_str(), "b1");
        assert_eq!(band.price, Some(29.99));
        assert!(band.desc.is_none());
        assert!(band.created_at.is_some());
    }

    #[test]
    fn test_price_label() {
        let mut band = Band::new("b1", "The Static", "Poster", 12.5);
        assert_eq!(band.price_label(), "$12.50");
        band.price = None;
        assert_eq!(band.price_label(), "Price unavailable");
    }
}
