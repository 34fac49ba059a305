//! Shared builders for unit tests.

use chrono::Utc;

use crate::types::{
    Cashier, CustomerType, ItemEligibility, PaymentMethod, Product, ProductStatus, Transaction,
    TransactionStatus,
};

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

/// A confirmed ₱250.00 cash sale paid with ₱300.00.
pub fn sample_transaction() -> Transaction {
    let now = Utc::now();
    Transaction {
        id: "665f1c2ab7e4d90012a3c4f5".to_string(),
        transaction_number: "TXN-000123".to_string(),
        items: vec![],
        subtotal_cents: 25000,
        tax_cents: 0,
        discount_cents: 0,
        total_cents: 25000,
        payment_method: PaymentMethod::Cash,
        cash_received_cents: 30000,
        change_cents: 5000,
        cashier: Cashier {
            id: "u-1".to_string(),
            name: "Maria".to_string(),
        },
        customer_type: CustomerType::Regular,
        customer_id: None,
        customer_name: None,
        notes: None,
        total_discount_amount_cents: 0,
        total_vat_exempt_cents: 0,
        status: TransactionStatus::Completed,
        created_at: now,
        updated_at: now,
    }
}
