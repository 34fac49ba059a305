//! In-memory backend for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use kahera_core::{Cashier, ItemEligibility, Product, ProductStatus};
use tokio::sync::Notify;

use crate::api::{CreateTransactionRequest, PosBackend, TransactionRecord};
use crate::error::{ClientError, ClientResult};

/// An available product with default senior/PWD eligibility.
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

pub fn api_error(status: u16, code: Option<&str>, message: &str) -> ClientError {
    ClientError::Api {
        status,
        code: code.map(str::to_string),
        message: message.to_string(),
    }
}

/// Scriptable [`PosBackend`].
///
/// Transactions succeed with sequential numbers unless a response was
/// queued with [`MockBackend::push_response`].
#[derive(Default)]
pub struct MockBackend {
    products: Mutex<Vec<Product>>,
    fail_listing: AtomicBool,
    responses: Mutex<VecDeque<ClientResult<TransactionRecord>>>,
    requests: Mutex<Vec<CreateTransactionRequest>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl MockBackend {
    pub fn with_products(products: Vec<Product>) -> Self {
        MockBackend {
            products: Mutex::new(products),
            ..Default::default()
        }
    }

    /// Holds every transaction request until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set_products(&self, products: Vec<Product>) {
        *self.products.lock().unwrap() = products;
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn push_response(&self, response: ClientResult<TransactionRecord>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn last_request(&self) -> Option<CreateTransactionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn accept(&self, request: &CreateTransactionRequest, number: usize) -> TransactionRecord {
        let subtotal: f64 = request
            .items
            .iter()
            .map(|i| i.unit_price * i.quantity as f64)
            .sum();
        let now = Utc::now();

        TransactionRecord {
            id: format!("665f1c2ab7e4d90012a3{:04}", number),
            transaction_number: format!("TXN-{:06}", number),
            subtotal,
            tax: request.tax,
            discount: request.discount,
            cashier_id: Some("u-1".to_string()),
            cashier_name: Some("Maria".to_string()),
            created_at: now,
            updated_at: Some(now),
        }
    }
}

#[async_trait]
impl PosBackend for MockBackend {
    async fn list_products(&self, status: Option<ProductStatus>) -> ClientResult<Vec<Product>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection refused".into()));
        }

        let products = self.products.lock().unwrap();
        Ok(products
            .iter()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect())
    }

    async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> ClientResult<TransactionRecord> {
        let number = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let queued = self.responses.lock().unwrap().pop_front();
        match queued {
            Some(response) => response,
            None => Ok(self.accept(request, number)),
        }
    }

    fn cashier(&self) -> Option<Cashier> {
        Some(Cashier {
            id: "u-1".to_string(),
            name: "Maria".to_string(),
        })
    }
}
