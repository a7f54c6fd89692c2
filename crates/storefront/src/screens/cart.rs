//! Cart screen.

use std::sync::Arc;

use serde::Serialize;

use crate::cart::{CartLine, CartSnapshot, CartSubscription};
use crate::error::add_breadcrumb;
use crate::state::AppState;

/// Display-ready cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub band: Option<String>,
    pub image: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id().to_string(),
            name: line.name().unwrap_or_else(|| line.id().as_str()).to_string(),
            band: line.band().map(str::to_string),
            image: line.image().map(str::to_string),
            quantity: line.quantity(),
            unit_price: line.unit_price().display(),
            subtotal: line.subtotal().display(),
        }
    }
}

/// Display-ready cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub total: String,
}

impl CartView {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Badge text for the cart button, `None` when empty.
    #[must_use]
    pub fn badge(&self) -> Option<String> {
        match self.item_count {
            0 => None,
            1..=99 => Some(self.item_count.to_string()),
            _ => Some("99+".to_string()),
        }
    }
}

impl From<&CartSnapshot> for CartView {
    fn from(snapshot: &CartSnapshot) -> Self {
        Self {
            lines: snapshot.lines().map(CartLineView::from).collect(),
            item_count: snapshot.item_count(),
            total: snapshot.total().display(),
        }
    }
}

/// Cart screen state.
pub struct CartScreen {
    state: AppState,
    updates: CartSubscription,
}

impl CartScreen {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        let updates = state.cart().subscribe();
        Self { state, updates }
    }

    #[must_use]
    pub fn view(&self) -> CartView {
        CartView::from(self.updates.current().as_ref())
    }

    /// Wait for the cart to change and return the new view.
    ///
    /// Returns `None` if the cart has been dropped.
    pub async fn changed(&mut self) -> Option<CartView> {
        let snapshot: Arc<CartSnapshot> = self.updates.changed().await?;
        Some(CartView::from(snapshot.as_ref()))
    }

    /// One more unit of a line already in the cart.
    pub fn increment(&self, id: &str) {
        if let Some(line) = self.state.cart().line(id) {
            self.state
                .cart()
                .update_quantity(id, i64::from(line.quantity()) + 1);
        }
    }

    /// One unit fewer; the last unit removes the line.
    pub fn remove(&self, id: &str) {
        self.state.cart().remove_item(id);
        add_breadcrumb("cart", "Removed item", Some(&[("item_id", id)]));
    }

    pub fn set_quantity(&self, id: &str, quantity: i64) {
        self.state.cart().update_quantity(id, quantity);
    }

    pub fn clear(&self) {
        self.state.cart().clear_cart();
        add_breadcrumb("cart", "Cleared cart", None);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::CartItem;
    use crate::screens::test_support::harness;

    #[test]
    fn test_empty_view() {
        let h = harness();
        let view = CartScreen::new(h.state).view();
        assert!(view.is_empty());
        assert_eq!(view.total, "$0.00");
        assert_eq!(view.badge(), None);
    }

    #[test]
    fn test_view_formats_lines() {
        let h = harness();
        let cart = h.state.cart();
        cart.add_item(&CartItem::new("1", 29.99).with_name("Tour Shirt"));
        cart.add_item(&CartItem::new("1", 29.99));
        cart.add_item(&CartItem::new("2", 19.99));

        let view = CartScreen::new(h.state.clone()).view();
        assert_eq!(view.item_count, 3);
        assert_eq!(view.total, "$79.97");
        assert_eq!(view.badge().as_deref(), Some("3"));

        assert_eq!(view.lines[0].name, "Tour Shirt");
        assert_eq!(view.lines[0].quantity, 2);
        assert_eq!(view.lines[0].unit_price, "$29.99");
        assert_eq!(view.lines[0].subtotal, "$59.98");
        // Unnamed lines fall back to the id.
        assert_eq!(view.lines[1].name, "2");
    }

    #[test]
    fn test_badge_caps() {
        let view = CartView {
            lines: Vec::new(),
            item_count: 150,
            total: "$0.00".to_string(),
        };
        assert_eq!(view.badge().as_deref(), Some("99+"));
    }

    #[test]
    fn test_line_actions() {
        let h = harness();
        h.state.cart().add_item(&CartItem::new("1", 10.0));
        let screen = CartScreen::new(h.state.clone());

        screen.increment("1");
        screen.increment("ghost");
        assert_eq!(screen.view().item_count, 2);

        screen.remove("1");
        assert_eq!(screen.view().item_count, 1);

        screen.set_quantity("1", 5);
        assert_eq!(screen.view().total, "$50.00");

        screen.clear();
        assert!(screen.view().is_empty());
    }

    #[tokio::test]
    async fn test_changed_follows_cart() {
        let h = harness();
        let mut screen = CartScreen::new(h.state.clone());
        h.state.cart().add_item(&CartItem::new("1", 5.5));

        let view = screen.changed().await.unwrap();
        assert_eq!(view.item_count, 1);
        assert_eq!(view.total, "$5.50");
    }
}
