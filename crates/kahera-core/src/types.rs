//! # Domain Types
//!
//! Core domain types used throughout Kahera POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │    Product      │   │   Transaction    │   │  CustomerType   │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  id (_id)       │   │  id (_id)        │   │  Regular        │      │
//! │  │  sku            │   │  txn number      │   │  Senior         │      │
//! │  │  price_cents    │   │  items[]         │   │  Pwd            │      │
//! │  │  stock, status  │   │  total_cents     │   └─────────────────┘      │
//! │  └─────────────────┘   └──────────────────┘                            │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │     Rate        │   │ ItemEligibility  │   │ TransactionStat │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  bps (u32)      │   │  discount        │   │  Completed      │      │
//! │  │  1200 = 12%     │   │  vat_exemption   │   │  Refunded       │      │
//! │  └─────────────────┘   └──────────────────┘   └─────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: backend record id (`_id`), used for relations
//! - Business ID: `sku` for products, `transaction_number` for sales

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1200 bps = 12% VAT, 2000 bps = 20% senior discount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage. Negative input becomes zero.
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct.max(0.0) * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// Listing status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// On the shelf and sellable.
    #[default]
    Available,
    /// Temporarily not sellable (recall, repricing, ...).
    Unavailable,
    /// Permanently removed from the catalog.
    Discontinued,
}

impl ProductStatus {
    /// Query-string form used by the product-listing endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "available",
            ProductStatus::Unavailable => "unavailable",
            ProductStatus::Discontinued => "discontinued",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which statutory benefits a line may receive for senior/PWD customers.
///
/// Eligibility is a property of the line, not of the whole transaction:
/// some goods get the VAT exemption without the 20% discount, others neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemEligibility {
    /// 20% senior/PWD discount applies.
    pub discount: bool,
    /// 12% VAT exemption applies.
    pub vat_exemption: bool,
}

impl ItemEligibility {
    /// Neither benefit applies.
    pub const fn none() -> Self {
        ItemEligibility {
            discount: false,
            vat_exemption: false,
        }
    }

    /// Returns true if at least one benefit applies.
    pub const fn any(&self) -> bool {
        self.discount || self.vat_exemption
    }
}

impl Default for ItemEligibility {
    fn default() -> Self {
        ItemEligibility {
            discount: true,
            vat_exemption: true,
        }
    }
}

/// A product available for sale, as last reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Backend record id.
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// VAT-inclusive shelf price in centavos.
    pub price_cents: i64,

    /// Units on hand at the time of the last fetch.
    pub stock: i64,

    pub status: ProductStatus,

    pub category: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Selling unit ("pc", "kg", "pack", ...).
    pub unit: String,

    /// Reorder threshold.
    pub min_stock: i64,

    /// Senior/PWD benefit eligibility for this product.
    pub eligibility: ItemEligibility,
}

impl Product {
    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if the product may be sold at all.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Available
    }

    /// Checks if stock is at or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

// =============================================================================
// Customer Type
// =============================================================================

/// Customer classification chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    #[default]
    Regular,
    /// Senior citizen (RA 9994).
    Senior,
    /// Person with disability (RA 10754).
    Pwd,
}

impl CustomerType {
    /// Returns true for classifications entitled to statutory benefits.
    pub fn is_discounted(&self) -> bool {
        !matches!(self, CustomerType::Regular)
    }

    /// Receipt label for the discount, if any.
    pub fn discount_label(&self) -> Option<&'static str> {
        match self {
            CustomerType::Regular => None,
            CustomerType::Senior => Some("SENIOR CITIZEN"),
            CustomerType::Pwd => Some("PWD"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Regular => "regular",
            CustomerType::Senior => "senior",
            CustomerType::Pwd => "pwd",
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CustomerType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "regular" | "" => Ok(CustomerType::Regular),
            "senior" | "senior_citizen" | "sc" => Ok(CustomerType::Senior),
            "pwd" => Ok(CustomerType::Pwd),
            other => Err(CoreError::UnknownCustomerType(other.to_string())),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid. Cash is the only tender the register accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// Status of a committed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Completed,
    Refunded,
}

/// The cashier a transaction is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cashier {
    pub id: String,
    pub name: String,
}

/// A line item in a transaction.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionItem {
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    pub quantity: i64,
    /// VAT-inclusive unit price at time of sale (frozen).
    pub unit_price_cents: i64,
    /// unit price × quantity, before any deduction.
    pub line_total_cents: i64,
    /// The 20% senior/PWD discount was applied to this line.
    pub discount_applied: bool,
    /// The VAT on this line was exempted.
    pub vat_exempt: bool,
    pub discount_amount_cents: i64,
    pub vat_exempt_amount_cents: i64,
}

impl TransactionItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }

    /// Total deduction on this line (discount + exempted VAT).
    pub fn deduction(&self) -> Money {
        Money::from_cents(self.discount_amount_cents + self.vat_exempt_amount_cents)
    }

    /// Amount payable for this line after deductions.
    pub fn net_total(&self) -> Money {
        self.line_total() - self.deduction()
    }
}

/// A completed transaction, as confirmed by the backend.
///
/// ## Invariants
/// - `total = subtotal - discount + tax`
/// - `change = cash_received - total`, never negative
/// - only ever constructed from a confirmed server response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    /// Backend record id (`_id`).
    pub id: String,
    /// Human-readable, server-assigned number.
    pub transaction_number: String,
    pub items: Vec<TransactionItem>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    /// Total deduction: senior/PWD discount plus exempted VAT.
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub cash_received_cents: i64,
    pub change_cents: i64,
    pub cashier: Cashier,
    pub customer_type: CustomerType,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    /// Sum of 20% discounts over all lines.
    pub total_discount_amount_cents: i64,
    /// Sum of exempted VAT over all lines.
    pub total_vat_exempt_cents: i64,
    pub status: TransactionStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn cash_received(&self) -> Money {
        Money::from_cents(self.cash_received_cents)
    }

    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents)
    }

    /// Last eight characters of the record id, as printed on receipts.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().rev().nth(7) {
            Some((idx, _)) => &self.id[idx..],
            None => &self.id,
        }
    }

    /// Marks a completed transaction as refunded.
    ///
    /// Only completed transactions can be refunded, and only once.
    pub fn refund(&mut self, at: DateTime<Utc>) -> CoreResult<()> {
        if self.status != TransactionStatus::Completed {
            return Err(CoreError::InvalidTransactionStatus {
                transaction_id: self.id.clone(),
                current_status: format!("{:?}", self.status),
            });
        }
        self.status = TransactionStatus::Refunded;
        self.updated_at = at;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
