//! # Validation Module
//!
//! Input validation for values the cashier types in.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Register UI                                                  │
//! │  └── Numeric keypad, disabled buttons                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: kahera-core (THIS MODULE)                                    │
//! │  └── Rates, tenders, customer details, notes                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Authoritative stock arbitration at transaction creation           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of free-text transaction notes.
pub const MAX_NOTES_LEN: usize = 500;

/// Maximum length of a customer name on a senior/PWD transaction.
pub const MAX_CUSTOMER_NAME_LEN: usize = 120;

/// Validates a percentage rate.
///
/// ## Rules
/// - Must be finite
/// - Must be between 0 and 100
///
/// ## Example
/// ```rust
/// use kahera_core::validation::validate_percentage;
///
/// assert!(validate_percentage("vat rate", 12.0).is_ok());
/// assert!(validate_percentage("vat rate", 120.0).is_err());
/// ```
pub fn validate_percentage(field: &str, pct: f64) -> ValidationResult<()> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a cash tender.
///
/// ## Rules
/// - Must be positive, except that ₱0.00 settles a ₱0.00 total
/// - Must not exceed the single-tender limit
pub fn validate_cash_tender(cash: Money, total: Money, limit: Money) -> ValidationResult<()> {
    if cash.is_negative() || (cash.is_zero() && total.is_positive()) {
        return Err(ValidationError::MustBePositive {
            field: "cash received".to_string(),
        });
    }

    if cash > limit {
        return Err(ValidationError::OutOfRange {
            field: "cash received".to_string(),
            min: 0,
            max: limit.pesos(),
        });
    }

    Ok(())
}

/// Validates optional free-text notes.
///
/// ## Returns
/// The trimmed notes, or `None` when blank.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        });
    }

    Ok(Some(notes.to_string()))
}

/// Validates the customer name captured for a senior/PWD transaction.
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }

    if name.chars().count() > MAX_CUSTOMER_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "customer name".to_string(),
            max: MAX_CUSTOMER_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
