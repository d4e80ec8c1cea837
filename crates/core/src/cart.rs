//! The shopper's cart.
//!
//! A cart is an ordered list of product snapshots with quantities, one per
//! tenant. Items keep the product data from the moment they were added so
//! the cart can be rendered and submitted without another catalog read.
//!
//! # Invariants
//!
//! - Every quantity is at least 1. Any operation that would take an item to
//!   zero removes it instead.
//! - A product appears at most once.
//! - Totals are recomputed from the items on every call.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{CategoryId, Price, ProductId};

/// A product snapshot plus the quantity ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub quantity: u32,
}

impl CartItem {
    fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image: product.image.clone(),
            category_id: product.category_id,
            quantity: 1,
        }
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// An ordered collection of [`CartItem`]s.
///
/// Serializes as a bare JSON array of items. Deserializing repairs stored
/// data that breaks the invariants: zero quantities are dropped and repeated
/// product ids are merged into the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add one unit of a product.
    ///
    /// Increments the quantity if the product is already in the cart,
    /// otherwise appends it with quantity 1. Returns the new quantity.
    pub fn add_item(&mut self, product: &Product) -> u32 {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return item.quantity;
        }
        self.items.push(CartItem::from_product(product));
        1
    }

    /// Change a quantity by `delta`, clamping at zero.
    ///
    /// An item whose quantity reaches zero is removed. Unknown ids are
    /// ignored. Returns `true` if an item was changed or removed.
    pub fn update_quantity(&mut self, id: ProductId, delta: i64) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return false;
        };
        let next = i64::from(item.quantity).saturating_add(delta).max(0);
        item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        self.items.retain(|i| i.quantity > 0);
        true
    }

    /// Remove a product regardless of quantity. Returns `true` if it was present.
    pub fn remove_item(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    /// Sum of price times quantity over all items.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, i| acc.saturating_add(i.quantity))
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(stored: Vec<CartItem>) -> Self {
        let mut items: Vec<CartItem> = Vec::with_capacity(stored.len());
        for item in stored.into_iter().filter(|i| i.quantity > 0) {
            match items.iter_mut().find(|i| i.id == item.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => items.push(item),
            }
        }
        Self { items }
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::product;

    #[test]
    fn test_add_same_product_twice_merges() {
        let taco = product("Taco", "2.50");
        let mut cart = Cart::new();

        assert_eq!(cart.add_item(&taco), 1);
        assert_eq!(cart.add_item(&taco), 2);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(taco.id).unwrap().quantity, 2);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let taco = product("Taco", "2.50");
        let agua = product("Agua", "1.00");
        let mut cart = Cart::new();
        cart.add_item(&taco);
        cart.add_item(&agua);
        cart.add_item(&taco);

        let names: Vec<_> = cart.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Taco", "Agua"]);
    }

    #[test]
    fn test_decrement_last_unit_removes_item() {
        let taco = product("Taco", "2.50");
        let mut cart = Cart::new();
        cart.add_item(&taco);

        assert!(cart.update_quantity(taco.id, -1));
        assert!(cart.is_empty());
        assert!(cart.get(taco.id).is_none());
    }

    #[test]
    fn test_large_negative_delta_clamps_to_removal() {
        let taco = product("Taco", "2.50");
        let mut cart = Cart::new();
        cart.add_item(&taco);
        cart.add_item(&taco);

        cart.update_quantity(taco.id, -100);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let taco = product("Taco", "2.50");
        let mut cart = Cart::new();
        cart.add_item(&taco);

        assert!(!cart.update_quantity(ProductId::generate(), 5));
        assert_eq!(cart.count(), 1);
    }

    #[test]
    fn test_remove_item() {
        let taco = product("Taco", "2.50");
        let mut cart = Cart::new();
        cart.add_item(&taco);
        cart.update_quantity(taco.id, 4);

        assert!(cart.remove_item(taco.id));
        assert!(!cart.remove_item(taco.id));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_follow_every_mutation() {
        let taco = product("Taco", "2.50");
        let agua = product("Agua", "1.25");
        let mut cart = Cart::new();

        cart.add_item(&taco);
        cart.update_quantity(taco.id, 2);
        cart.add_item(&agua);
        assert_eq!(cart.count(), 4);
        assert_eq!(cart.total().fixed(), "8.75");

        cart.update_quantity(agua.id, -1);
        assert_eq!(cart.count(), 3);
        assert_eq!(cart.total().fixed(), "7.50");
    }

    #[test]
    fn test_quantities_never_drop_below_one() {
        let a = product("A", "1");
        let b = product("B", "2");
        let mut cart = Cart::new();
        let deltas = [3_i64, -1, -5, 2, 0, -2, 7, -6];

        for (step, delta) in deltas.iter().enumerate() {
            let target = if step % 2 == 0 { &a } else { &b };
            cart.add_item(target);
            cart.update_quantity(target.id, *delta);
            assert!(cart.items().iter().all(|i| i.quantity >= 1));
            let summed: u32 = cart.items().iter().map(|i| i.quantity).sum();
            assert_eq!(cart.count(), summed);
        }
    }

    #[test]
    fn test_serialized_form_is_a_plain_array() {
        let taco = product("Taco", "2.50");
        let mut cart = Cart::new();
        cart.add_item(&taco);

        let json = serde_json::to_value(&cart).unwrap();
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Taco");
        assert_eq!(items[0]["quantity"], 1);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_deserialize_repairs_broken_storage() {
        let id = ProductId::generate();
        let other = ProductId::generate();
        let json = serde_json::json!([
            { "id": id, "name": "Taco", "price": "2.50", "quantity": 1 },
            { "id": other, "name": "Gone", "price": "1.00", "quantity": 0 },
            { "id": id, "name": "Taco", "price": "2.50", "quantity": 2 },
        ]);

        let cart: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(id).unwrap().quantity, 3);
    }
}
