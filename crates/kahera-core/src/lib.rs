//! # kahera-core: Pure Checkout Logic for Kahera POS
//!
//! This crate holds the pricing and checkout rules of the register as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kahera POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Register UI / CLI shell                      │   │
//! │  │    Product grid ──► Cart panel ──► Cash dialog ──► Receipt      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kahera-client                                │   │
//! │  │   StockValidator, TransactionSubmitter, ProductCatalog, API     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kahera-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────┐ ┌──────────┐ ┌──────┐ ┌───────┐ ┌──────────┐       │   │
//! │  │   │  vat  │ │ discount │ │ cart │ │ stock │ │ checkout │       │   │
//! │  │   └───────┘ └──────────┘ └──────┘ └───────┘ └──────────┘       │   │
//! │  │   ┌───────┐ ┌──────────┐ ┌────────────┐ ┌─────────┐            │   │
//! │  │   │ money │ │  types   │ │ validation │ │ receipt │            │   │
//! │  │   └───────┘ └──────────┘ └────────────┘ └─────────┘            │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer centavo arithmetic
//! - [`types`] - Domain types (Product, Transaction, CustomerType, ...)
//! - [`vat`] - VAT extraction from VAT-inclusive totals
//! - [`discount`] - Senior citizen / PWD discount and VAT exemption
//! - [`cart`] - Cart aggregation with per-line stock ceilings
//! - [`stock`] - Cart vs. latest inventory comparison
//! - [`checkout`] - Checkout dialog state machine and submission drafts
//! - [`receipt`] - Printable receipt composition
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use kahera_core::money::Money;
//! use kahera_core::vat::compute_vat;
//!
//! let breakdown = compute_vat(Money::from_cents(11200), 12.0);
//! assert_eq!(breakdown.net_sales, Money::from_cents(10000));
//! assert_eq!(breakdown.vat_amount, Money::from_cents(1200));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod discount;
pub mod error;
pub mod money;
pub mod receipt;
pub mod stock;
pub mod types;
pub mod validation;
pub mod vat;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartTotals, QuantityOutcome};
pub use checkout::{
    change_due, CheckoutDraft, CheckoutFlow, CheckoutParams, CheckoutState, ServerConfirmation,
};
pub use discount::{compute_discounts, DiscountContext, DiscountPolicy, LineDiscount};
pub use error::{CartError, CoreError, FlowError, ValidationError};
pub use money::Money;
pub use receipt::{Receipt, ReceiptLine, ReceiptSummary, StoreInfo};
pub use stock::{check_cart_stock, StockIssue};
pub use types::*;
pub use vat::{compute_vat, VatBreakdown};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Philippine VAT rate (percent) applied to VAT-inclusive shelf prices.
pub const DEFAULT_VAT_RATE_PERCENT: f64 = 12.0;

/// Statutory senior citizen / PWD discount (percent).
pub const DEFAULT_SENIOR_DISCOUNT_PERCENT: f64 = 20.0;

/// Upper sanity bound on a single cash tender, in centavos (₱10,000.00).
///
/// ## Business Reason
/// Catches fat-fingered tenders such as typing 15000 instead of 1500.
pub const DEFAULT_CASH_LIMIT_CENTS: i64 = 1_000_000;

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

#[cfg(test)]
pub(crate) mod fixtures;
