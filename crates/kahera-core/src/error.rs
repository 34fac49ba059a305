//! # Errors
//!
//! What the pure layer can refuse.
//!
//! ```text
//! CartError        cart mutation refused, cart unchanged (shown as a warning)
//! FlowError        checkout dialog action not allowed in the current state
//! ValidationError  malformed input (names, notes, percentages, tender)
//! CoreError        everything else, wraps ValidationError
//!
//! ValidationError ─► CoreError ─► kahera_client::CheckoutError ─► register
//! ```
//!
//! Messages name the product and quantities involved so they can be shown
//! to the cashier as-is.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Transaction is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Refunding an already refunded transaction
    #[error("Transaction {transaction_id} is {current_status}, cannot perform operation")]
    InvalidTransactionStatus {
        transaction_id: String,
        current_status: String,
    },

    /// Customer classification string not recognised.
    #[error("Unknown customer type: {0}")]
    UnknownCustomerType(String),

    /// Cash tendered cannot complete the sale.
    #[error("Invalid cash tender: {reason}")]
    InvalidTender { reason: String },

    /// Cart has no lines to check out.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart was edited after the sale was priced.
    #[error("Cart changed after the total was computed; review the sale and try again")]
    CartChanged,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Cart Error
// =============================================================================

/// Rejected cart mutations.
///
/// These never reach the network. The cart is left exactly as it was.
///
/// ## User Workflow
/// ```text
/// Tap "Sardinas 155g" (stock: 1, in cart: 1)
///      │
///      ▼
/// add_to_cart → StockLimitReached { available: 1 }
///      │
///      ▼
/// UI shows: "Stock limit reached for Sardinas 155g (1 available)"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Product has no stock at all.
    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    /// Incrementing would exceed the known stock.
    #[error("Stock limit reached for {name} ({available} available)")]
    StockLimitReached { name: String, available: i64 },

    /// Product status is not available.
    #[error("{name} is not available for sale")]
    Unavailable { name: String },

    /// Product id is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartFull { max: usize },
}

// =============================================================================
// Flow Error
// =============================================================================

/// Illegal checkout dialog transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// The requested action is not valid in the current state.
    #[error("Cannot {action} while checkout is {state}")]
    InvalidTransition { action: &'static str, state: &'static str },

    /// Cash is below the total or above the single-tender limit.
    #[error("Cash tender not acceptable: {reason}")]
    TenderRejected { reason: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Malformed cashier input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
