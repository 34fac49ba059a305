//! # Stock Check
//!
//! Compares cart lines against the latest inventory snapshot.
//!
//! This is advisory. Another register may sell the last unit between this
//! check and submission; the backend is the final arbiter.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartItem;
use crate::types::Product;

/// A cart line that the latest inventory cannot satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockIssue {
    /// Product no longer appears in the inventory listing.
    Missing { product_id: String, name: String },

    /// Product is listed but not sellable.
    Unavailable { product_id: String, name: String },

    /// Fewer units on hand than the cart holds.
    Insufficient {
        product_id: String,
        name: String,
        available: i64,
        in_cart: i64,
    },
}

impl StockIssue {
    pub fn product_id(&self) -> &str {
        match self {
            StockIssue::Missing { product_id, .. }
            | StockIssue::Unavailable { product_id, .. }
            | StockIssue::Insufficient { product_id, .. } => product_id,
        }
    }
}

impl fmt::Display for StockIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockIssue::Missing { name, .. } => write!(f, "{} is no longer available", name),
            StockIssue::Unavailable { name, .. } => {
                write!(f, "{} is currently unavailable", name)
            }
            StockIssue::Insufficient {
                name,
                available,
                in_cart,
                ..
            } => write!(
                f,
                "{}: only {} available (you have {} in cart)",
                name, available, in_cart
            ),
        }
    }
}

/// Checks every cart line against `available_products`.
///
/// ## Returns
/// One issue per failing line, in cart order. Empty means the cart is
/// satisfiable as of this snapshot.
///
/// ## Example
/// ```rust
/// use kahera_core::stock::check_cart_stock;
///
/// assert!(check_cart_stock(&[], &[]).is_empty());
/// ```
pub fn check_cart_stock(lines: &[CartItem], available_products: &[Product]) -> Vec<StockIssue> {
    lines
        .iter()
        .filter_map(|item| {
            let Some(product) = available_products
                .iter()
                .find(|p| p.id == item.product_id)
            else {
                return Some(StockIssue::Missing {
                    product_id: item.product_id.clone(),
                    name: item.name.clone(),
                });
            };

            if !product.is_available() {
                return Some(StockIssue::Unavailable {
                    product_id: item.product_id.clone(),
                    name: item.name.clone(),
                });
            }

            if product.stock < item.quantity {
                return Some(StockIssue::Insufficient {
                    product_id: item.product_id.clone(),
                    name: item.name.clone(),
                    available: product.stock,
                    in_cart: item.quantity,
                });
            }

            None
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
