//! # Product Catalog Cache
//!
//! Last-known product list, shared between the register and background
//! refresh tasks.
//!
//! ```text
//! ┌──────────────┐   refresh_catalog()   ┌───────────────────────────────┐
//! │ PosBackend   │──────────────────────►│ Arc<RwLock<ProductCatalog>>   │
//! └──────────────┘                       │  readers: product grid,       │
//!                                        │           stock validator     │
//!                                        └───────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kahera_core::{Product, ProductStatus};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::PosBackend;
use crate::error::ClientResult;

/// Catalog handle shared across tasks.
pub type SharedCatalog = Arc<RwLock<ProductCatalog>>;

/// Cached product list.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: Vec<Product>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shareable, empty catalog.
    pub fn shared() -> SharedCatalog {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Replaces the cached list wholesale.
    pub fn replace(&mut self, products: Vec<Product>) {
        self.products = products;
        self.refreshed_at = Some(Utc::now());
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn find_by_sku(&self, sku: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.sku.eq_ignore_ascii_case(sku))
    }

    /// Products at or below their reorder threshold.
    pub fn low_stock(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_low_stock()).collect()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Fetches available products and stores them in `catalog`.
///
/// ## Returns
/// The fresh product list.
pub async fn refresh_catalog(
    backend: &dyn PosBackend,
    catalog: &SharedCatalog,
) -> ClientResult<Vec<Product>> {
    let products = backend
        .list_products(Some(ProductStatus::Available))
        .await
        .map_err(|e| {
            warn!(error = %e, "Product refresh failed");
            e
        })?;

    debug!(count = products.len(), "Product catalog refreshed");
    catalog.write().await.replace(products.clone());

    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{product, MockBackend};

    #[tokio::test]
    async fn test_refresh_replaces_products() {
        let backend =
            MockBackend::with_products(vec![product("a", 1000, 5), product("b", 2000, 1)]);
        let catalog = ProductCatalog::shared();

        let fresh = refresh_catalog(&backend, &catalog).await.unwrap();
        assert_eq!(fresh.len(), 2);

        let cached = catalog.read().await;
        assert_eq!(cached.len(), 2);
        assert!(cached.refreshed_at().is_some());
        assert_eq!(cached.get("b").unwrap().stock, 1);
        assert_eq!(cached.find_by_sku("sku-a").unwrap().id, "a");
        assert_eq!(cached.low_stock().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_list() {
        let backend = MockBackend::with_products(vec![product("a", 1000, 5)]);
        let catalog = ProductCatalog::shared();
        refresh_catalog(&backend, &catalog).await.unwrap();

        backend.fail_listing(true);
        assert!(refresh_catalog(&backend, &catalog).await.is_err());
        assert_eq!(catalog.read().await.len(), 1);
    }
}
