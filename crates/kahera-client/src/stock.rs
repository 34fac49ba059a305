//! # Stock Validator
//!
//! Re-checks the cart against live inventory before checkout.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_cart_stock(cart)                                              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  GET /products?status=available                                         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  check_cart_stock(cart, products) ──► no issues ──► { valid: true }     │
//! │        │                                                                │
//! │        ▼ issues                                                         │
//! │  catalog.replace(products)                                              │
//! │  cart.refresh_stock(products)       (ceilings only, quantities kept)    │
//! │  publish StockDrift                                                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  { valid: false, errors: ["Kape: only 2 available (you have 3 ...)"] }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The check is advisory. The backend still arbitrates at submission.

use std::sync::Arc;

use kahera_core::{check_cart_stock, Cart, ProductStatus, StockIssue};
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::PosBackend;
use crate::catalog::SharedCatalog;
use crate::error::ClientResult;
use crate::events::{EventBus, PosEvent};

/// Outcome of a stock check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockValidation {
    pub valid: bool,
    /// Cashier-facing messages, one per failing line.
    pub errors: Vec<String>,
    #[serde(skip)]
    pub issues: Vec<StockIssue>,
}

impl StockValidation {
    fn from_issues(issues: Vec<StockIssue>) -> Self {
        StockValidation {
            valid: issues.is_empty(),
            errors: issues.iter().map(ToString::to_string).collect(),
            issues,
        }
    }
}

/// Compares carts against the backend's current inventory.
pub struct StockValidator {
    backend: Arc<dyn PosBackend>,
    catalog: SharedCatalog,
    events: EventBus,
}

impl StockValidator {
    pub fn new(backend: Arc<dyn PosBackend>, catalog: SharedCatalog, events: EventBus) -> Self {
        StockValidator {
            backend,
            catalog,
            events,
        }
    }

    /// Fetches available products and checks every cart line against them.
    ///
    /// When the cart is no longer satisfiable the cached catalog and the
    /// cart's stock ceilings are refreshed so the cashier sees current
    /// numbers.
    pub async fn validate_cart_stock(&self, cart: &mut Cart) -> ClientResult<StockValidation> {
        let products = self
            .backend
            .list_products(Some(ProductStatus::Available))
            .await?;

        let issues = check_cart_stock(cart.items(), &products);
        if issues.is_empty() {
            debug!(lines = cart.item_count(), "Cart stock verified");
            return Ok(StockValidation::from_issues(issues));
        }

        warn!(
            lines = cart.item_count(),
            issues = issues.len(),
            "Cart no longer matches inventory"
        );

        cart.refresh_stock(&products);
        let product_count = products.len();
        self.catalog.write().await.replace(products);

        self.events.publish(PosEvent::InventoryRefreshed { product_count });
        self.events.publish(PosEvent::StockDrift {
            issues: issues.clone(),
        });

        Ok(StockValidation::from_issues(issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductCatalog;
    use crate::testing::{product, MockBackend};

    fn setup(backend: Arc<MockBackend>) -> (StockValidator, SharedCatalog, EventBus) {
        let catalog = ProductCatalog::shared();
        let events = EventBus::default();
        (
            StockValidator::new(backend, catalog.clone(), events.clone()),
            catalog,
            events,
        )
    }

    #[tokio::test]
    async fn test_valid_cart() {
        let backend = Arc::new(MockBackend::with_products(vec![product("a", 1000, 5)]));
        let (validator, catalog, _) = setup(backend);

        let mut cart = Cart::new();
        cart.add_to_cart(&product("a", 1000, 5)).unwrap();

        let result = validator.validate_cart_stock(&mut cart).await.unwrap();
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(catalog.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_drift_refreshes_catalog_and_ceilings() {
        let mut sold_down = product("a", 1000, 2);
        sold_down.name = "Kape 3-in-1".into();
        let backend = Arc::new(MockBackend::with_products(vec![sold_down]));
        let (validator, catalog, events) = setup(backend);
        let mut rx = events.subscribe();

        let mut cart = Cart::new();
        let mut original = product("a", 1000, 10);
        original.name = "Kape 3-in-1".into();
        cart.add_to_cart(&original).unwrap();
        cart.update_quantity("a", 3).unwrap();
        cart.add_to_cart(&product("gone", 500, 10)).unwrap();

        let result = validator.validate_cart_stock(&mut cart).await.unwrap();

        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                "Kape 3-in-1: only 2 available (you have 3 in cart)".to_string(),
                "Product gone is no longer available".to_string(),
            ]
        );
        assert_eq!(cart.get("a").unwrap().stock_ceiling, 2);
        assert_eq!(cart.get("a").unwrap().quantity, 3);
        assert_eq!(catalog.read().await.len(), 1);

        assert_eq!(
            rx.recv().await.unwrap(),
            PosEvent::InventoryRefreshed { product_count: 1 }
        );
        assert!(matches!(rx.recv().await.unwrap(), PosEvent::StockDrift { .. }));
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let backend = Arc::new(MockBackend::with_products(vec![]));
        backend.fail_listing(true);
        let (validator, _, _) = setup(backend);

        let mut cart = Cart::new();
        cart.add_to_cart(&product("a", 1000, 5)).unwrap();

        assert!(validator.validate_cart_stock(&mut cart).await.is_err());
        assert_eq!(cart.get("a").unwrap().stock_ceiling, 5);
    }
}
