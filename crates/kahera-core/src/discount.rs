//! # Discount Calculator
//!
//! Senior citizen and PWD benefits, computed per cart line.
//!
//! ## Order of Deductions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line gross (VAT-inclusive)                ₱112.00                      │
//! │        │                                                                │
//! │        ▼  1. VAT exemption (if the line allows it)                      │
//! │  net = gross × 100 / 112                   ₱100.00                      │
//! │  vat_exempt = gross − net                   ₱12.00                      │
//! │        │                                                                │
//! │        ▼  2. 20% discount (if the line allows it)                       │
//! │  discount = 20% × net   (or × gross when not exempted)  ₱20.00          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  payable = gross − vat_exempt − discount    ₱80.00                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Eligibility lives on each line. A senior buying a mix of goods can get
//! both benefits on one line and only the exemption on the next.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartItem;
use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{CustomerType, Rate};
use crate::validation::validate_percentage;

/// Rates used for senior/PWD benefits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountPolicy {
    /// Statutory discount (2000 bps = 20%).
    pub discount_rate: Rate,
    /// VAT rate embedded in shelf prices (1200 bps = 12%).
    pub vat_rate: Rate,
}

impl DiscountPolicy {
    /// Builds a policy from percentages, rejecting values outside 0..=100.
    pub fn from_percentages(discount_pct: f64, vat_pct: f64) -> CoreResult<Self> {
        validate_percentage("senior discount", discount_pct)?;
        validate_percentage("vat rate", vat_pct)?;

        Ok(DiscountPolicy {
            discount_rate: Rate::from_percentage(discount_pct),
            vat_rate: Rate::from_percentage(vat_pct),
        })
    }
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        DiscountPolicy {
            discount_rate: Rate::from_bps(2000),
            vat_rate: Rate::from_bps(1200),
        }
    }
}

/// Deductions computed for one cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineDiscount {
    pub product_id: String,
    /// unit price × quantity, VAT-inclusive.
    pub gross: Money,
    pub discount_applied: bool,
    pub vat_exempt: bool,
    pub discount_amount: Money,
    pub vat_exempt_amount: Money,
}

impl LineDiscount {
    fn undiscounted(item: &CartItem) -> Self {
        LineDiscount {
            product_id: item.product_id.clone(),
            gross: item.line_total(),
            discount_applied: false,
            vat_exempt: false,
            discount_amount: Money::zero(),
            vat_exempt_amount: Money::zero(),
        }
    }

    /// Discount plus exempted VAT.
    pub fn deduction(&self) -> Money {
        self.discount_amount + self.vat_exempt_amount
    }

    /// What the customer pays for this line.
    pub fn net_total(&self) -> Money {
        self.gross - self.deduction()
    }
}

/// Discount outcome for a whole cart. Attached to the transaction at commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DiscountContext {
    pub customer_type: CustomerType,
    /// "SENIOR CITIZEN" or "PWD"; absent for regular customers.
    pub label: Option<String>,
    pub lines: Vec<LineDiscount>,
    pub total_discount_amount: Money,
    pub total_vat_exempt: Money,
}

impl DiscountContext {
    /// Sum of all discounts and exempted VAT.
    pub fn total_deduction(&self) -> Money {
        self.total_discount_amount + self.total_vat_exempt
    }

    /// Looks up the computed deduction for a product line.
    pub fn line(&self, product_id: &str) -> Option<&LineDiscount> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Returns true if any line received a benefit.
    pub fn has_deductions(&self) -> bool {
        !self.total_deduction().is_zero()
    }
}

/// Computes per-line and aggregate senior/PWD deductions.
///
/// ## Example
/// ```rust
/// use kahera_core::cart::Cart;
/// use kahera_core::discount::{compute_discounts, DiscountPolicy};
/// use kahera_core::types::{CustomerType, ItemEligibility, Product, ProductStatus};
///
/// let product = Product {
///     id: "p1".into(),
///     name: "Gatas 1L".into(),
///     price_cents: 11200,
///     stock: 5,
///     status: ProductStatus::Available,
///     category: "Dairy".into(),
///     sku: "GAT-1L".into(),
///     unit: "pc".into(),
///     min_stock: 1,
///     eligibility: ItemEligibility::default(),
/// };
/// let mut cart = Cart::new();
/// cart.add_to_cart(&product).unwrap();
///
/// let ctx = compute_discounts(CustomerType::Senior, cart.items(), &DiscountPolicy::default());
/// assert_eq!(ctx.total_vat_exempt.cents(), 1200);
/// assert_eq!(ctx.total_discount_amount.cents(), 2000);
/// assert_eq!(ctx.label.as_deref(), Some("SENIOR CITIZEN"));
/// ```
pub fn compute_discounts(
    customer_type: CustomerType,
    lines: &[CartItem],
    policy: &DiscountPolicy,
) -> DiscountContext {
    let lines: Vec<LineDiscount> = lines
        .iter()
        .map(|item| {
            if customer_type.is_discounted() {
                discount_line(item, policy)
            } else {
                LineDiscount::undiscounted(item)
            }
        })
        .collect();

    let total_discount_amount = lines.iter().map(|l| l.discount_amount).sum();
    let total_vat_exempt = lines.iter().map(|l| l.vat_exempt_amount).sum();

    DiscountContext {
        customer_type,
        label: customer_type.discount_label().map(str::to_string),
        lines,
        total_discount_amount,
        total_vat_exempt,
    }
}

fn discount_line(item: &CartItem, policy: &DiscountPolicy) -> LineDiscount {
    let mut line = LineDiscount::undiscounted(item);
    let mut base = line.gross;

    if item.eligibility.vat_exemption {
        let net = line.gross.tax_exclusive(policy.vat_rate);
        line.vat_exempt = true;
        line.vat_exempt_amount = line.gross - net;
        base = net;
    }

    if item.eligibility.discount {
        line.discount_applied = true;
        line.discount_amount = base.percentage(policy.discount_rate);
    }

    line
}

// =============================================================================
// Unit Tests
// =============================================================================
