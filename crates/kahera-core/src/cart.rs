//! # Cart Aggregator
//!
//! Holds the line items of the sale being rung up.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action           Method                  Cart State Change     │
//! │  ──────────────           ──────                  ─────────────────     │
//! │                                                                         │
//! │  Tap Product ────────────► add_to_cart() ───────► push / qty + 1       │
//! │                                                                         │
//! │  Edit Quantity ──────────► update_quantity() ───► qty = clamp(n)       │
//! │                                                                         │
//! │  Click Remove ───────────► remove_from_cart() ──► items.remove(i)      │
//! │                                                                         │
//! │  Sale Completed ─────────► clear_cart() ────────► items.clear()        │
//! │                                                                         │
//! │  NOTE: Every mutation is synchronous and local. Nothing here talks     │
//! │        to the backend; the StockValidator does that before checkout.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CartError;
use crate::money::Money;
use crate::types::{ItemEligibility, Product};
use crate::MAX_CART_ITEMS;

/// An item in the cart.
///
/// ## Design Notes
/// - `unit_price_cents` is frozen when the line is created
/// - `stock_ceiling` is the last-known stock and is refreshed on every add
///   and every catalog refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// VAT-inclusive unit price at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Always at least 1 while the line exists.
    pub quantity: i64,

    pub category: String,

    /// Maximum quantity permitted for this line.
    pub stock_ceiling: i64,

    /// Senior/PWD benefit eligibility carried from the product.
    pub eligibility: ItemEligibility,

    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a one-unit line from a product.
    pub fn from_product(product: &Product) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity: 1,
            category: product.category.clone(),
            stock_ceiling: product.stock,
            eligibility: product.eligibility,
            added_at: Utc::now(),
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Unit price × quantity, VAT-inclusive, undiscounted.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// Result of a quantity edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityOutcome {
    /// The quantity was applied (possibly raised to the minimum of 1).
    Updated(i64),
    /// The requested quantity exceeded the known stock and was clamped.
    ClampedToStock { requested: i64, applied: i64 },
}

impl QuantityOutcome {
    /// The quantity now on the line.
    pub fn quantity(&self) -> i64 {
        match self {
            QuantityOutcome::Updated(q) => *q,
            QuantityOutcome::ClampedToStock { applied, .. } => *applied,
        }
    }

    /// Returns true when the cashier should see a "stock limit exceeded" warning.
    pub fn was_clamped(&self) -> bool {
        matches!(self, QuantityOutcome::ClampedToStock { .. })
    }
}

/// The cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product increments)
/// - `1 <= quantity <= stock_ceiling` after every successful mutation
/// - At most [`MAX_CART_ITEMS`] distinct lines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,

    /// When the cart was created/last cleared
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - stock <= 0: rejected with `OutOfStock`, nothing inserted
    /// - already in cart and at the stock ceiling: rejected with
    ///   `StockLimitReached`, quantity unchanged
    /// - already in cart: quantity + 1
    /// - otherwise: new line with quantity 1
    ///
    /// ## Returns
    /// The line's quantity after the add.
    pub fn add_to_cart(&mut self, product: &Product) -> Result<i64, CartError> {
        if product.stock <= 0 {
            return Err(CartError::OutOfStock {
                name: product.name.clone(),
            });
        }

        if !product.is_available() {
            return Err(CartError::Unavailable {
                name: product.name.clone(),
            });
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            item.stock_ceiling = product.stock;
            if item.quantity + 1 > product.stock {
                return Err(CartError::StockLimitReached {
                    name: product.name.clone(),
                    available: product.stock,
                });
            }
            item.quantity += 1;
            return Ok(item.quantity);
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CartError::CartFull {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem::from_product(product));
        Ok(1)
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - quantity below 1 is raised to 1
    /// - quantity above the stock ceiling is clamped to it and reported as
    ///   `ClampedToStock`
    /// - a line whose ceiling dropped to zero keeps quantity 1; the stock
    ///   validator reports it before checkout
    pub fn update_quantity(
        &mut self,
        product_id: &str,
        quantity: i64,
    ) -> Result<QuantityOutcome, CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.to_string()))?;

        let requested = quantity.max(1);
        if requested > item.stock_ceiling {
            let applied = item.stock_ceiling.max(1);
            item.quantity = applied;
            return Ok(QuantityOutcome::ClampedToStock {
                requested: quantity,
                applied,
            });
        }

        item.quantity = requested;
        Ok(QuantityOutcome::Updated(requested))
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove_from_cart(&mut self, product_id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != initial_len
    }

    /// Clears all lines.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Σ(unit price × quantity), undiscounted and VAT-inclusive.
    pub fn calculate_total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Updates stock ceilings from a fresh product list.
    ///
    /// Lines whose product is missing from `products` keep their ceiling.
    /// Quantities are not touched.
    ///
    /// ## Returns
    /// Number of lines whose quantity now exceeds the refreshed ceiling.
    pub fn refresh_stock(&mut self, products: &[Product]) -> usize {
        let mut over = 0;
        for item in &mut self.items {
            if let Some(p) = products.iter().find(|p| p.id == item.product_id) {
                item.stock_ceiling = p.stock;
            }
            if item.quantity > item.stock_ceiling {
                over += 1;
            }
        }
        over
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

/// Cart totals summary for the cart panel.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total: cart.calculate_total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::product;
    use crate::types::ProductStatus;

    #[test]
    fn test_add_out_of_stock_never_inserts() {
        let mut cart = Cart::new();
        let err = cart.add_to_cart(&product("p1", 5000, 0)).unwrap_err();

        assert!(matches!(err, CartError::OutOfStock { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_twice_with_single_stock() {
        let mut cart = Cart::new();
        let p = product("p1", 5000, 1);

        assert_eq!(cart.add_to_cart(&p).unwrap(), 1);
        let err = cart.add_to_cart(&p).unwrap_err();

        assert_eq!(
            err,
            CartError::StockLimitReached {
                name: p.name.clone(),
                available: 1
            }
        );
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.get("p1").unwrap().quantity, 1);
    }

    #[test]
    fn test_add_same_product_increments() {
        let mut cart = Cart::new();
        let p = product("p1", 5000, 10);

        cart.add_to_cart(&p).unwrap();
        cart.add_to_cart(&p).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_add_unavailable_product() {
        let mut cart = Cart::new();
        let mut p = product("p1", 5000, 10);
        p.status = ProductStatus::Unavailable;

        assert!(matches!(
            cart.add_to_cart(&p),
            Err(CartError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_update_quantity_clamps_to_stock() {
        let mut cart = Cart::new();
        cart.add_to_cart(&product("p1", 5000, 5)).unwrap();

        let outcome = cart.update_quantity("p1", 999).unwrap();

        assert_eq!(
            outcome,
            QuantityOutcome::ClampedToStock {
                requested: 999,
                applied: 5
            }
        );
        assert!(outcome.was_clamped());
        assert_eq!(cart.get("p1").unwrap().quantity, 5);
    }

    #[test]
    fn test_update_quantity_minimum_is_one() {
        let mut cart = Cart::new();
        cart.add_to_cart(&product("p1", 5000, 5)).unwrap();

        assert_eq!(cart.update_quantity("p1", 0).unwrap(), QuantityOutcome::Updated(1));
        assert_eq!(cart.update_quantity("p1", -4).unwrap().quantity(), 1);
        assert_eq!(cart.update_quantity("p1", 3).unwrap().quantity(), 3);
    }

    #[test]
    fn test_update_quantity_unknown_line() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.update_quantity("nope", 2),
            Err(CartError::NotInCart("nope".into()))
        );
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_to_cart(&product("p1", 5000, 5)).unwrap();
        cart.add_to_cart(&product("p2", 3000, 5)).unwrap();

        assert!(cart.remove_from_cart("p1"));
        assert!(!cart.remove_from_cart("p1"));
        assert_eq!(cart.item_count(), 1);

        cart.clear_cart();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_calculate_total_is_idempotent() {
        let mut cart = Cart::new();
        let a = product("a", 5000, 10);
        cart.add_to_cart(&a).unwrap();
        cart.add_to_cart(&a).unwrap();
        cart.add_to_cart(&product("b", 3000, 10)).unwrap();

        let first = cart.calculate_total();
        let second = cart.calculate_total();

        assert_eq!(first, Money::from_cents(13000));
        assert_eq!(first, second);
    }

    #[test]
    fn test_refresh_stock_lowers_ceiling() {
        let mut cart = Cart::new();
        let p = product("p1", 5000, 5);
        cart.add_to_cart(&p).unwrap();
        cart.update_quantity("p1", 4).unwrap();

        let fresh = vec![product("p1", 5000, 2)];
        assert_eq!(cart.refresh_stock(&fresh), 1);
        assert_eq!(cart.get("p1").unwrap().stock_ceiling, 2);
        assert_eq!(cart.get("p1").unwrap().quantity, 4);
    }

    #[test]
    fn test_cart_totals() {
        let mut cart = Cart::new();
        cart.add_to_cart(&product("p1", 1999, 5)).unwrap();
        let totals = CartTotals::from(&cart);
        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.total.cents(), 1999);
    }
}
