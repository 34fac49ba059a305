//! # VAT Calculator
//!
//! Splits a VAT-inclusive total into net sales and VAT.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shelf prices already include 12% VAT.                                  │
//! │                                                                         │
//! │  total ₱112.00 ──┬──► vat = total × 12 / 112 = ₱12.00                  │
//! │                  └──► net = total − vat     = ₱100.00                  │
//! │                                                                         │
//! │  Both outputs are rounded to centavos independently from the           │
//! │  full-precision value, never from each other.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invalid input is normalized, never rejected: negative totals clamp to
//! zero and a rate outside 0..=100 falls back to 12%.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Rate;
use crate::validation::validate_percentage;
use crate::DEFAULT_VAT_RATE_PERCENT;

/// VAT split of a VAT-inclusive total. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VatBreakdown {
    /// VAT-inclusive total.
    pub total: Money,
    /// VAT contained in the total.
    pub vat_amount: Money,
    /// VAT-exclusive portion ("VATable sales").
    pub net_sales: Money,
    pub vat_rate: Rate,
}

/// Computes the VAT breakdown of a VAT-inclusive total.
///
/// ## Example
/// ```rust
/// use kahera_core::money::Money;
/// use kahera_core::vat::compute_vat;
///
/// let b = compute_vat(Money::from_cents(13000), 12.0);
/// assert_eq!(b.net_sales.cents(), 11607);
/// assert_eq!(b.vat_amount.cents(), 1393);
///
/// // Negative totals clamp to zero
/// let b = compute_vat(Money::from_cents(-5000), 12.0);
/// assert!(b.total.is_zero() && b.vat_amount.is_zero() && b.net_sales.is_zero());
/// ```
pub fn compute_vat(total: Money, vat_rate_percent: f64) -> VatBreakdown {
    let pct = if validate_percentage("vat rate", vat_rate_percent).is_ok() {
        vat_rate_percent
    } else {
        DEFAULT_VAT_RATE_PERCENT
    };

    compute_vat_at(total, Rate::from_percentage(pct))
}

/// Same as [`compute_vat`] with an already-normalized rate.
pub fn compute_vat_at(total: Money, rate: Rate) -> VatBreakdown {
    let total = total.non_negative();
    VatBreakdown {
        total,
        vat_amount: total.inclusive_tax(rate),
        net_sales: total.tax_exclusive(rate),
        vat_rate: rate,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
