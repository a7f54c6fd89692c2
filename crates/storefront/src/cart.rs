//! Client-side shopping cart.
//!
//! The cart is an owned state object: one [`CartStore`] per app instance,
//! shared by reference through [`crate::state::AppState`]. Lines are keyed by
//! merchandise id and every effective mutation publishes a fresh
//! [`CartSnapshot`] to subscribers through a `watch` channel.
//!
//! All four mutation operations are synchronous and total. Invalid input and
//! unknown ids are silent no-ops, and a no-op publishes nothing.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use bandmerch_core::{ItemId, Price};

use crate::models::Band;

/// Input to [`CartStore::add_item`].
///
/// Only `id` and `unit_price` are required; an item missing either is
/// ignored. The remaining fields are copied into the line on first insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartItem {
    pub id: Option<ItemId>,
    pub unit_price: Option<f64>,
    pub name: Option<String>,
    pub band: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl CartItem {
    /// Item with just an id and a price.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, unit_price: f64) -> Self {
        Self {
            id: Some(id.into()),
            unit_price: Some(unit_price),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// The id and price, if both are present and usable.
    fn key(&self) -> Option<(&ItemId, Price)> {
        let id = self.id.as_ref().filter(|id| !id.is_blank())?;
        let price = Price::new(self.unit_price?);
        price.is_valid().then_some((id, price))
    }
}

impl From<&Band> for CartItem {
    fn from(band: &Band) -> Self {
        Self {
            id: Some(band.id.clone()),
            unit_price: band.price,
            name: Some(band.item.clone()),
            band: Some(band.band.clone()),
            description: band.desc.clone(),
            image: band.image.clone(),
        }
    }
}

/// One distinct item in the cart.
///
/// `quantity` is always at least 1; `subtotal` is recomputed from
/// `unit_price * quantity` whenever the quantity changes.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    id: ItemId,
    unit_price: Price,
    quantity: u32,
    subtotal: Price,
    name: Option<String>,
    band: Option<String>,
    description: Option<String>,
    image: Option<String>,
}

impl CartLine {
    fn first(id: ItemId, unit_price: Price, item: &CartItem) -> Self {
        Self {
            id,
            unit_price,
            quantity: 1,
            subtotal: unit_price,
            name: item.name.clone(),
            band: item.band.clone(),
            description: item.description.clone(),
            image: item.image.clone(),
        }
    }

    fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.subtotal = self.unit_price * quantity;
    }

    #[must_use]
    pub const fn id(&self) -> &ItemId {
        &self.id
    }

    #[must_use]
    pub const fn unit_price(&self) -> Price {
        self.unit_price
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.subtotal
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn band(&self) -> Option<&str> {
        self.band.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }
}

/// Immutable point-in-time view of the cart.
///
/// Each effective mutation produces a new snapshot; compare with
/// [`CartSnapshot::same_as`] to detect change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartSnapshot {
    lines: BTreeMap<ItemId, CartLine>,
}

impl CartSnapshot {
    /// Lines ordered by item id.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    #[must_use]
    pub fn line(&self, id: &str) -> Option<&CartLine> {
        self.lines.get(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.values().map(CartLine::quantity).sum()
    }

    /// Sum of all subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.values().map(CartLine::subtotal).sum()
    }

    /// Whether two handles point at the same published snapshot.
    #[must_use]
    pub fn same_as(a: &Arc<Self>, b: &Arc<Self>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

/// Receives a new snapshot after every effective cart mutation.
#[derive(Debug)]
pub struct CartSubscription {
    rx: watch::Receiver<Arc<CartSnapshot>>,
}

impl CartSubscription {
    /// Wait for the next published snapshot.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<CartSnapshot>> {
        self.rx.changed().await.ok()?;
        Some(Arc::clone(&self.rx.borrow_and_update()))
    }

    /// The latest snapshot, without waiting.
    #[must_use]
    pub fn current(&self) -> Arc<CartSnapshot> {
        Arc::clone(&self.rx.borrow())
    }
}

/// The cart store.
#[derive(Debug)]
pub struct CartStore {
    tx: watch::Sender<Arc<CartSnapshot>>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(CartSnapshot::default()));
        Self { tx }
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CartSnapshot> {
        Arc::clone(&self.tx.borrow())
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.tx.borrow().item_count()
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.tx.borrow().total()
    }

    #[must_use]
    pub fn line(&self, id: &str) -> Option<CartLine> {
        self.tx.borrow().line(id).cloned()
    }

    /// Subscribe to future snapshots.
    #[must_use]
    pub fn subscribe(&self) -> CartSubscription {
        CartSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Add one unit of `item`.
    ///
    /// Items without an id or a usable price are ignored.
    pub fn add_item(&self, item: &CartItem) {
        let Some((id, unit_price)) = item.key() else {
            debug!(?item.id, "ignoring cart item without id or price");
            return;
        };

        self.mutate(|lines| {
            match lines.get_mut(id.as_str()) {
                Some(line) => line.set_quantity(line.quantity.saturating_add(1)),
                None => {
                    lines.insert(id.clone(), CartLine::first(id.clone(), unit_price, item));
                }
            }
            true
        });
        debug!(item_id = %id, "added item to cart");
    }

    /// Remove one unit of `id`, deleting the line when none remain.
    pub fn remove_item(&self, id: &str) {
        self.mutate(|lines| {
            let Some(line) = lines.get_mut(id) else {
                return false;
            };
            if line.quantity <= 1 {
                lines.remove(id);
            } else {
                line.set_quantity(line.quantity - 1);
            }
            true
        });
    }

    /// Set the quantity of an existing line. Zero or less deletes it.
    ///
    /// Never creates a line.
    pub fn update_quantity(&self, id: &str, quantity: i64) {
        self.mutate(|lines| {
            if !lines.contains_key(id) {
                return false;
            }
            if quantity <= 0 {
                lines.remove(id);
                return true;
            }
            let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            match lines.get_mut(id) {
                Some(line) if line.quantity != quantity => {
                    line.set_quantity(quantity);
                    true
                }
                _ => false,
            }
        });
    }

    /// Remove every line.
    pub fn clear_cart(&self) {
        self.mutate(|lines| {
            let had_lines = !lines.is_empty();
            lines.clear();
            had_lines
        });
    }

    /// Apply `f` to a copy of the current lines and publish the result as a
    /// new snapshot if `f` reports a change.
    fn mutate(&self, f: impl FnOnce(&mut BTreeMap<ItemId, CartLine>) -> bool) {
        self.tx.send_if_modified(|current| {
            let mut lines = current.lines.clone();
            if !f(&mut lines) {
                return false;
            }
            *current = Arc::new(CartSnapshot { lines });
            true
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx(a: Price, b: f64) -> bool {
        (a.amount() - b).abs() < EPSILON
    }

    fn shirt() -> CartItem {
        CartItem::new("1", 29.99)
            .with_name("Test Item")
            .with_image("https://example.com/image.jpg")
    }

    fn poster() -> CartItem {
        CartItem::new("2", 19.99).with_name("Another Item")
    }

    #[test]
    fn test_initial_state_is_empty() {
        let cart = CartStore::new();
        assert!(cart.snapshot().is_empty());
        assert_eq!(cart.item_count(), 0);
        assert!(approx(cart.total(), 0.0));
    }

    #[test]
    fn test_add_without_id_is_noop() {
        let cart = CartStore::new();
        let before = cart.snapshot();

        cart.add_item(&CartItem::default());
        cart.add_item(&CartItem {
            id: Some(ItemId::new("  ")),
            unit_price: Some(10.0),
            ..CartItem::default()
        });

        let after = cart.snapshot();
        assert!(CartSnapshot::same_as(&before, &after));
        assert_eq!(cart.item_count(), 0);
        assert!(approx(cart.total(), 0.0));
    }

    #[test]
    fn test_add_without_usable_price_is_noop() {
        let cart = CartStore::new();
        cart.add_item(&CartItem {
            id: Some(ItemId::new("1")),
            ..CartItem::default()
        });
        cart.add_item(&CartItem::new("2", f64::NAN));
        cart.add_item(&CartItem::new("3", -4.0));
        assert!(cart.snapshot().is_empty());
    }

    #[test]
    fn test_add_new_item() {
        let cart = CartStore::new();
        cart.add_item(&shirt());

        let line = cart.line("1").unwrap();
        assert_eq!(line.quantity(), 1);
        assert!(approx(line.subtotal(), 29.99));
        assert_eq!(line.name(), Some("Test Item"));
        assert_eq!(line.image(), Some("https://example.com/image.jpg"));
        assert_eq!(cart.item_count(), 1);
        assert!(approx(cart.total(), 29.99));
    }

    #[test]
    fn test_adding_same_item_aggregates() {
        let cart = CartStore::new();
        cart.add_item(&shirt());
        cart.add_item(&shirt());

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.len(), 1);
        let line = snapshot.line("1").unwrap();
        assert_eq!(line.quantity(), 2);
        assert!(approx(line.subtotal(), 59.98));
        assert_eq!(snapshot.item_count(), 2);
        assert!(approx(snapshot.total(), 59.98));
    }

    #[test]
    fn test_metadata_is_snapshot_of_first_add() {
        let cart = CartStore::new();
        cart.add_item(&shirt());
        cart.add_item(&CartItem::new("1", 99.0).with_name("Renamed"));

        let line = cart.line("1").unwrap();
        assert_eq!(line.name(), Some("Test Item"));
        assert!(approx(line.unit_price(), 29.99));
        assert!(approx(line.subtotal(), 59.98));
    }

    #[test]
    fn test_multi_item_total() {
        let cart = CartStore::new();
        cart.add_item(&shirt());
        cart.add_item(&poster());

        assert_eq!(cart.snapshot().len(), 2);
        assert_eq!(cart.item_count(), 2);
        assert!(approx(cart.total(), 49.98));
    }

    #[test]
    fn test_remove_decrements_then_deletes() {
        let cart = CartStore::new();
        cart.add_item(&CartItem::new("1", 10.0));
        cart.add_item(&CartItem::new("1", 10.0));

        cart.remove_item("1");
        let line = cart.line("1").unwrap();
        assert_eq!(line.quantity(), 1);
        assert!(approx(line.subtotal(), 10.0));

        cart.remove_item("1");
        assert!(cart.line("1").is_none());
        assert!(cart.snapshot().is_empty());
    }

    #[test]
    fn test_remove_keeps_other_lines() {
        let cart = CartStore::new();
        cart.add_item(&shirt());
        cart.add_item(&poster());
        cart.remove_item("1");

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.lines().next().unwrap().id().as_str(), "2");
        assert_eq!(snapshot.item_count(), 1);
        assert!(approx(snapshot.total(), 19.99));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let cart = CartStore::new();
        cart.add_item(&shirt());
        let before = cart.snapshot();
        cart.remove_item("ghost");
        assert!(CartSnapshot::same_as(&before, &cart.snapshot()));
    }

    #[test]
    fn test_update_quantity_sets_and_recomputes() {
        let cart = CartStore::new();
        cart.add_item(&shirt());
        cart.update_quantity("1", 5);

        let line = cart.line("1").unwrap();
        assert_eq!(line.quantity(), 5);
        assert_eq!(cart.item_count(), 5);
        assert!(approx(cart.total(), 149.95));
    }

    #[test]
    fn test_update_quantity_below_zero_deletes() {
        let cart = CartStore::new();
        cart.add_item(&CartItem::new("1", 10.0));
        cart.update_quantity("1", -1);

        assert!(cart.line("1").is_none());
        assert_eq!(cart.item_count(), 0);
        assert!(approx(cart.total(), 0.0));
    }

    #[test]
    fn test_update_quantity_zero_deletes() {
        let cart = CartStore::new();
        cart.add_item(&CartItem::new("1", 10.0));
        cart.update_quantity("1", 0);
        assert!(cart.snapshot().is_empty());
    }

    #[test]
    fn test_update_unknown_never_creates() {
        let cart = CartStore::new();
        cart.update_quantity("ghost", 5);
        assert!(cart.snapshot().is_empty());
    }

    #[test]
    fn test_clear_resets() {
        let cart = CartStore::new();
        cart.add_item(&shirt());
        cart.add_item(&shirt());
        cart.add_item(&poster());

        cart.clear_cart();

        let snapshot = cart.snapshot();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.item_count(), 0);
        assert!(approx(snapshot.total(), 0.0));
    }

    #[test]
    fn test_each_mutation_publishes_new_snapshot() {
        let cart = CartStore::new();
        let empty = cart.snapshot();

        cart.add_item(&shirt());
        let one = cart.snapshot();
        assert!(!CartSnapshot::same_as(&empty, &one));

        cart.update_quantity("1", 3);
        let three = cart.snapshot();
        assert!(!CartSnapshot::same_as(&one, &three));

        cart.clear_cart();
        assert!(!CartSnapshot::same_as(&three, &cart.snapshot()));

        // Earlier snapshots are untouched.
        assert_eq!(one.line("1").unwrap().quantity(), 1);
        assert_eq!(three.item_count(), 3);
    }

    #[test]
    fn test_noop_publishes_nothing() {
        let cart = CartStore::new();
        let sub = cart.subscribe();
        cart.clear_cart();
        cart.update_quantity("ghost", 2);
        cart.remove_item("ghost");
        assert!(!sub.rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let cart = CartStore::new();
        let mut sub = cart.subscribe();

        cart.add_item(&shirt());
        let snapshot = sub.changed().await.unwrap();
        assert_eq!(snapshot.item_count(), 1);
        assert!(CartSnapshot::same_as(&snapshot, &cart.snapshot()));
    }

    #[test]
    fn test_subscription_current_is_latest_without_waiting() {
        let cart = CartStore::new();
        let sub = cart.subscribe();
        cart.add_item(&shirt());
        cart.add_item(&shirt());

        let current = sub.current();
        assert_eq!(current.item_count(), 2);
        assert!(CartSnapshot::same_as(&current, &cart.snapshot()));
    }

    #[tokio::test]
    async fn test_subscription_ends_when_store_dropped() {
        let cart = CartStore::new();
        let mut sub = cart.subscribe();
        drop(cart);
        assert!(sub.changed().await.is_none());
    }

    #[test]
    fn test_from_band_copies_metadata() {
        let mut band = Band::new("b7", "The Static", "Tour Shirt", 25.0);
        band.desc = Some("Black, cotton".to_string());
        let item = CartItem::from(&band);
        assert_eq!(item.id, Some(ItemId::new("b7")));
        assert_eq!(item.band.as_deref(), Some("The Static"));
        assert_eq!(item.description.as_deref(), Some("Black, cotton"));
    }
}
