//! Cart Aggregate

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::product::Product;
use crate::domain::value_objects::{Money, Sale};
use crate::pricing::{self, PricedLine, Totals};

/// A denormalized product snapshot plus a quantity. Fields are copied by
/// value at add time, so later catalog edits never reach an item already in
/// a cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub image: String,
    pub price: Money,
    #[serde(default)]
    pub sale: Sale,
    pub quantity: u32,
}

impl LineItem {
    fn snapshot(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
            price: product.price,
            sale: product.sale,
            quantity: 1,
        }
    }
}

impl PricedLine for LineItem {
    fn unit_price(&self) -> Money { self.price }
    fn sale(&self) -> Sale { self.sale }
    fn quantity(&self) -> u32 { self.quantity }
}

/// In-memory cart state: at most one line item per product id. All
/// operations are synchronous; persistence is the cart store's concern.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self { Self::default() }
    pub fn from_items(items: Vec<LineItem>) -> Self { Self { items } }

    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn len(&self) -> usize { self.items.len() }

    /// Adds one unit, merging into the existing line for the same product.
    pub fn add_item(&mut self, product: &Product) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            existing.quantity += 1;
        } else {
            self.items.push(LineItem::snapshot(product));
        }
    }

    /// Removing an absent product is a no-op.
    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Quantities below 1 are rejected as a no-op; removal is the only path
    /// to an empty line. Unknown product ids are also a no-op.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity < 1 {
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn totals(&self) -> Totals {
        pricing::totals(&self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::ProductDraft;
    use rust_decimal::Decimal;

    fn product(name: &str, price: i64, sale: u8) -> Product {
        Product::create(ProductDraft {
            name: name.into(),
            category: "clothing".into(),
            subcategory: "shirts".into(),
            price: Money::new(Decimal::from(price)),
            sale: Sale::new(sale).unwrap(),
            image: format!("/img/{}.jpg", name),
            description: "test".into(),
        })
    }

    #[test]
    fn test_add_merges_by_product_id() {
        let p = product("shirt", 100, 0);
        let mut cart = Cart::new();
        cart.add_item(&p);
        cart.add_item(&p);
        cart.add_item(&p);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_snapshot_survives_catalog_edits() {
        let mut p = product("shirt", 100, 0);
        let mut cart = Cart::new();
        cart.add_item(&p);
        p.price = Money::new(Decimal::from(999));
        assert_eq!(cart.items()[0].price, Money::new(Decimal::from(100)));
    }

    #[test]
    fn test_update_quantity_rejects_below_one() {
        let p = product("shirt", 100, 0);
        let mut cart = Cart::new();
        cart.add_item(&p);
        cart.update_quantity(&p.id, 0);
        assert_eq!(cart.items()[0].quantity, 1);
        cart.update_quantity(&p.id, 4);
        assert_eq!(cart.items()[0].quantity, 4);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let p = product("shirt", 100, 0);
        let mut cart = Cart::new();
        cart.add_item(&p);
        let before = cart.items().to_vec();
        cart.remove_item("no-such-id");
        assert_eq!(cart.items(), before.as_slice());
        cart.remove_item(&p.id);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals() {
        let discounted = product("shirt", 100, 10);
        let plain = product("belt", 50, 0);
        let mut cart = Cart::new();
        cart.add_item(&discounted);
        cart.add_item(&discounted);
        cart.add_item(&plain);
        let totals = cart.totals();
        assert_eq!(totals.total_quantity, 3);
        assert_eq!(totals.total_amount, Money::new(Decimal::from(230)));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(&product("shirt", 100, 0));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.totals().total_quantity, 0);
    }
}
