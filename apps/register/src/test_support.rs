//! Helpers for command tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use kahera_client::{
    ClientError, ClientResult, CreateTransactionRequest, PosBackend, TransactionRecord,
};
use kahera_core::{ItemEligibility, Product, ProductStatus};

pub fn product(id: &str, price_cents: i64, stock: i64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {}", id),
        price_cents,
        stock,
        status: ProductStatus::Available,
        category: "Grocery".to_string(),
        sku: format!("SKU-{}", id.to_uppercase()),
        unit: "pc".to_string(),
        min_stock: 2,
        eligibility: ItemEligibility::default(),
    }
}

/// Backend with a fixed product list that accepts or refuses every sale.
pub struct StubBackend {
    products: Mutex<Vec<Product>>,
    refusal: Mutex<Option<ClientError>>,
    pub requests: Mutex<Vec<CreateTransactionRequest>>,
}

impl StubBackend {
    pub fn new(products: Vec<Product>) -> Self {
        StubBackend {
            products: Mutex::new(products),
            refusal: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Refuses the next sale with `err` and drops the stock it lists to `stock_after`.
    pub fn refuse_next(&self, err: ClientError, stock_after: Vec<Product>) {
        *self.refusal.lock().unwrap() = Some(err);
        *self.products.lock().unwrap() = stock_after;
    }
}

#[async_trait]
impl PosBackend for StubBackend {
    async fn list_products(&self, _status: Option<ProductStatus>) -> ClientResult<Vec<Product>> {
        Ok(self.products.lock().unwrap().clone())
    }

    async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> ClientResult<TransactionRecord> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(err) = self.refusal.lock().unwrap().take() {
            return Err(err);
        }

        let subtotal: f64 = request
            .items
            .iter()
            .map(|i| i.unit_price * i.quantity as f64)
            .sum();
        Ok(TransactionRecord {
            id: "665f1c2ab7e4d90012a3c4f5".to_string(),
            transaction_number: "TXN-000123".to_string(),
            subtotal,
            tax: request.tax,
            discount: request.discount,
            cashier_id: Some("u-1".to_string()),
            cashier_name: Some("Maria".to_string()),
            created_at: Utc::now(),
            updated_at: None,
        })
    }
}
