//! # Peso Amounts
//!
//! Every amount in the workspace is a whole number of centavos. VAT-inclusive
//! pricing makes this matter: extracting 12% VAT from ₱130.00 gives
//! ₱13.928571..., and the receipt, the sales report and the backend must all
//! agree on ₱13.93.
//!
//! ```text
//!   wire (f64 pesos) ──from_major_f64──► Money (i64 centavos) ──to_major_f64──► wire
//!                                          │
//!                      percentage / inclusive_tax / tax_exclusive
//!                      (i128 intermediates, half away from zero)
//! ```
//!
//! ```rust
//! use kahera_core::money::Money;
//!
//! let kape = Money::from_cents(5000);
//! let pandesal = Money::from_cents(3000);
//! assert_eq!(kape * 2 + pandesal, Money::from_cents(13000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};
use ts_rs::TS;

use crate::types::Rate;

// =============================================================================
// Money Type
// =============================================================================

/// Centavos, signed so deductions and refunds can go below zero.
///
/// ```text
/// Product.price ─► CartItem ─► line total ─► cart subtotal
///                                  │
///           ┌──────────────────────┴──────────────────────┐
///           ▼                                             ▼
///   VatBreakdown (regular)                 DiscountContext (senior / PWD)
///           └──────────────► Transaction ◄────────────────┘
///                                  │
///                    cash received − total = change
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// `from_major_minor(-5, 50)` is -₱5.50: the sign lives on the peso part.
    pub const fn from_major_minor(pesos: i64, centavos: i64) -> Self {
        let sign = if pesos < 0 { -1 } else { 1 };
        Money(pesos * 100 + sign * centavos)
    }

    /// Converts a floating decimal peso amount from the wire into centavos.
    ///
    /// Rounds half away from zero. Non-finite input becomes zero.
    ///
    /// ## Example
    /// ```rust
    /// use kahera_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_f64(19.99).cents(), 1999);
    /// assert_eq!(Money::from_major_f64(f64::NAN).cents(), 0);
    /// ```
    pub fn from_major_f64(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        Money((amount * 100.0).round() as i64)
    }

    /// Pesos as a floating decimal, for request bodies only.
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole pesos, truncated toward zero.
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Centavo digits, 0-99 regardless of sign.
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn zero() -> Self {
        Money(0)
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Negative amounts become ₱0.00.
    pub const fn non_negative(&self) -> Self {
        Money(if self.0 < 0 { 0 } else { self.0 })
    }

    /// Line total for `qty` units at this unit price.
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `rate` percent of this amount, rounded half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use kahera_core::money::Money;
    /// use kahera_core::types::Rate;
    ///
    /// let base = Money::from_cents(10000);
    /// assert_eq!(base.percentage(Rate::from_bps(2000)).cents(), 2000);
    /// ```
    pub fn percentage(&self, rate: Rate) -> Money {
        Money(div_round(self.0 as i128 * rate.bps() as i128, 10_000))
    }

    /// Extracts the tax portion already contained in this VAT-inclusive amount.
    ///
    /// `amount × rate / (100% + rate)`, rounded half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use kahera_core::money::Money;
    /// use kahera_core::types::Rate;
    ///
    /// // ₱112.00 at 12% contains ₱12.00 of VAT
    /// let vat = Money::from_cents(11200).inclusive_tax(Rate::from_bps(1200));
    /// assert_eq!(vat.cents(), 1200);
    /// ```
    pub fn inclusive_tax(&self, rate: Rate) -> Money {
        let bps = rate.bps() as i128;
        Money(div_round(self.0 as i128 * bps, 10_000 + bps))
    }

    /// Returns the tax-exclusive portion of this VAT-inclusive amount.
    ///
    /// `amount × 100% / (100% + rate)`, rounded half away from zero. The
    /// rounding is applied to the full-precision quotient, so
    /// `inclusive_tax + tax_exclusive` can differ from the amount by one
    /// centavo.
    pub fn tax_exclusive(&self, rate: Rate) -> Money {
        let bps = rate.bps() as i128;
        Money(div_round(self.0 as i128 * 10_000, 10_000 + bps))
    }
}

/// Integer division rounding half away from zero. `den` must be positive.
fn div_round(num: i128, den: i128) -> i64 {
    let rounded = if num >= 0 {
        (2 * num + den) / (2 * den)
    } else {
        -((-2 * num + den) / (2 * den))
    };
    rounded as i64
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money the way it prints on a receipt: `₱10.99`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₱{}.{:02}", sign, self.pesos().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money(0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, qty: i64) -> Money {
        self.multiply_quantity(qty)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        let m = Money::from_major_minor(10, 99);
        assert_eq!(m.cents(), 1099);
        assert_eq!((m.pesos(), m.cents_part()), (10, 99));

        let refund = Money::from_major_minor(-5, 50);
        assert_eq!(refund.cents(), -550);
        assert_eq!(refund.cents_part(), 50);
    }

    #[test]
    fn test_wire_conversion() {
        assert_eq!(Money::from_major_f64(50.0).cents(), 5000);
        assert_eq!(Money::from_major_f64(116.07).cents(), 11607);
        assert_eq!(Money::from_major_f64(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_major_f64(f64::INFINITY).cents(), 0);
        assert!((Money::from_cents(13093).to_major_f64() - 130.93).abs() < 1e-9);
    }

    #[test]
    fn test_receipt_display() {
        assert_eq!(Money::from_cents(123450).to_string(), "₱1234.50");
        assert_eq!(Money::from_cents(7).to_string(), "₱0.07");
        assert_eq!((-Money::from_cents(550)).to_string(), "-₱5.50");
    }

    #[test]
    fn test_operators_and_sum() {
        let kape = Money::from_cents(5000);
        let pandesal = Money::from_cents(3000);

        assert_eq!(kape * 2 - pandesal, Money::from_cents(7000));
        let lines = [kape, pandesal, pandesal];
        assert_eq!(lines.iter().sum::<Money>(), Money::from_cents(11000));
        assert_eq!(lines.into_iter().sum::<Money>(), Money::from_cents(11000));
    }

    #[test]
    fn test_inclusive_tax_split() {
        let rate = Rate::from_bps(1200);
        let total = Money::from_cents(13000);

        let vat = total.inclusive_tax(rate);
        let net = total.tax_exclusive(rate);

        assert_eq!(vat.cents(), 1393);
        assert_eq!(net.cents(), 11607);
        assert_eq!(vat + net, total);
    }

    #[test]
    fn test_percentage_rounds_half_away_from_zero() {
        let twenty = Rate::from_bps(2000);
        // 0.6 centavo rounds up, 0.4 rounds down
        assert_eq!(Money::from_cents(3).percentage(twenty).cents(), 1);
        assert_eq!(Money::from_cents(2).percentage(twenty).cents(), 0);
        assert_eq!(Money::from_cents(-3).percentage(twenty).cents(), -1);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_positive() && !Money::zero().is_negative());
        assert!(Money::from_cents(-100).is_negative());
        assert_eq!(Money::from_cents(-100).non_negative(), Money::zero());
        assert_eq!(Money::from_cents(5).non_negative().cents(), 5);
    }
}
