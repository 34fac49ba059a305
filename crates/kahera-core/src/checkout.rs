//! # Checkout
//!
//! The checkout dialog state machine and the draft a sale is submitted from.
//!
//! ## Dialog Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────┐ select_payment ┌───────────────────────┐ begin_submit        │
//! │   │ Idle │───────────────►│ PaymentMethodSelected │────────────┐       │
//! │   └──────┘                │  (cash amount entry)  │            │       │
//! │      ▲  ▲      cancel     └───────────────────────┘            ▼       │
//! │      │  └─────────────────────────┘      ▲            ┌────────────┐   │
//! │      │                                   └────────────│ Submitting │   │
//! │      │                                  submit_failed └─────┬──────┘   │
//! │      │            reset / cancel     ┌───────────┐          │          │
//! │      └───────────────────────────────│ Completed │◄─────────┘          │
//! │                                      └───────────┘   complete(tx)      │
//! │                                                                         │
//! │  begin_submit is gated on  total <= cash <= cash_limit                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cancelling never creates anything. A transaction only exists once the
//! backend has confirmed it and [`CheckoutDraft::confirm`] has merged the
//! server's fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::{Cart, CartItem};
use crate::discount::{compute_discounts, DiscountContext, DiscountPolicy};
use crate::error::{CoreError, CoreResult, FlowError};
use crate::money::Money;
use crate::types::{
    Cashier, CustomerType, PaymentMethod, Transaction, TransactionItem, TransactionStatus,
};
use crate::validation::{validate_cash_tender, validate_customer_name, validate_notes};
use crate::DEFAULT_CASH_LIMIT_CENTS;

/// Change owed to the customer. Negative when the cash does not cover the total.
///
/// ## Example
/// ```rust
/// use kahera_core::checkout::change_due;
/// use kahera_core::money::Money;
///
/// assert_eq!(change_due(Money::from_cents(25000), Money::from_cents(30000)).cents(), 5000);
/// assert!(change_due(Money::from_cents(25000), Money::from_cents(20000)).is_negative());
/// ```
pub fn change_due(total: Money, cash_received: Money) -> Money {
    cash_received - total
}

fn check_tender(total: Money, cash: Money, cash_limit: Money) -> Result<(), String> {
    if cash < total {
        return Err(format!("cash {} is less than the total {}", cash, total));
    }
    if cash > cash_limit {
        return Err(format!("cash {} exceeds the {} limit", cash, cash_limit));
    }
    Ok(())
}

// =============================================================================
// Checkout Flow
// =============================================================================

/// Where the checkout dialog currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutState {
    /// Cart review, no dialog open.
    Idle,

    /// Payment method picked, cashier entering the amount tendered.
    PaymentMethodSelected {
        method: PaymentMethod,
        cash_received: Option<Money>,
    },

    /// Request in flight. Further submissions are refused.
    Submitting {
        method: PaymentMethod,
        cash_received: Money,
    },

    /// Receipt shown.
    Completed { transaction: Box<Transaction> },
}

impl CheckoutState {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::PaymentMethodSelected { .. } => "awaiting payment",
            CheckoutState::Submitting { .. } => "submitting",
            CheckoutState::Completed { .. } => "completed",
        }
    }
}

/// Checkout dialog state machine.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    state: CheckoutState,
    cash_limit: Money,
}

impl CheckoutFlow {
    pub fn new(cash_limit: Money) -> Self {
        CheckoutFlow {
            state: CheckoutState::Idle,
            cash_limit,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn cash_limit(&self) -> Money {
        self.cash_limit
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, CheckoutState::Submitting { .. })
    }

    /// The confirmed transaction while the receipt is shown.
    pub fn completed_transaction(&self) -> Option<&Transaction> {
        match &self.state {
            CheckoutState::Completed { transaction } => Some(transaction),
            _ => None,
        }
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    /// Opens the payment step. Switching method keeps any entered cash.
    pub fn select_payment(&mut self, method: PaymentMethod) -> Result<(), FlowError> {
        self.state = match &self.state {
            CheckoutState::Idle => CheckoutState::PaymentMethodSelected {
                method,
                cash_received: None,
            },
            CheckoutState::PaymentMethodSelected { cash_received, .. } => {
                CheckoutState::PaymentMethodSelected {
                    method,
                    cash_received: *cash_received,
                }
            }
            _ => return Err(self.invalid("select a payment method")),
        };
        Ok(())
    }

    /// Records the amount tendered. Any amount is accepted here; the gate
    /// is applied by [`Self::can_complete`] and [`Self::begin_submit`].
    pub fn enter_cash(&mut self, amount: Money) -> Result<(), FlowError> {
        if let CheckoutState::PaymentMethodSelected { cash_received, .. } = &mut self.state {
            *cash_received = Some(amount);
            return Ok(());
        }
        Err(self.invalid("enter cash"))
    }

    /// Returns true when the entered cash covers `total` and is within the limit.
    pub fn can_complete(&self, total: Money) -> bool {
        match &self.state {
            CheckoutState::PaymentMethodSelected {
                cash_received: Some(cash),
                ..
            } => check_tender(total, *cash, self.cash_limit).is_ok(),
            _ => false,
        }
    }

    /// Gates on the tender and moves to `Submitting`.
    ///
    /// ## Returns
    /// The payment method and cash to submit with.
    pub fn begin_submit(&mut self, total: Money) -> Result<(PaymentMethod, Money), FlowError> {
        let (method, cash) = match &self.state {
            CheckoutState::PaymentMethodSelected {
                method,
                cash_received: Some(cash),
            } => (*method, *cash),
            CheckoutState::PaymentMethodSelected {
                cash_received: None,
                ..
            } => {
                return Err(FlowError::TenderRejected {
                    reason: "no cash amount entered".to_string(),
                })
            }
            _ => return Err(self.invalid("submit")),
        };

        check_tender(total, cash, self.cash_limit)
            .map_err(|reason| FlowError::TenderRejected { reason })?;

        self.state = CheckoutState::Submitting {
            method,
            cash_received: cash,
        };
        Ok((method, cash))
    }

    /// Returns to cash entry after a failed submission, keeping the amount.
    pub fn submit_failed(&mut self) -> Result<(), FlowError> {
        match &self.state {
            CheckoutState::Submitting {
                method,
                cash_received,
            } => {
                self.state = CheckoutState::PaymentMethodSelected {
                    method: *method,
                    cash_received: Some(*cash_received),
                };
                Ok(())
            }
            _ => Err(self.invalid("report a failed submission")),
        }
    }

    /// Shows the receipt for a confirmed transaction.
    pub fn complete(&mut self, transaction: Transaction) -> Result<(), FlowError> {
        if !self.is_submitting() {
            return Err(self.invalid("complete"));
        }
        self.state = CheckoutState::Completed {
            transaction: Box::new(transaction),
        };
        Ok(())
    }

    /// Closes the dialog and discards the entered cash.
    pub fn cancel(&mut self) -> Result<(), FlowError> {
        if self.is_submitting() {
            return Err(self.invalid("cancel"));
        }
        self.state = CheckoutState::Idle;
        Ok(())
    }

    /// Closes the receipt and returns to cart review.
    pub fn reset(&mut self) -> Result<(), FlowError> {
        match &self.state {
            CheckoutState::Completed { .. } | CheckoutState::Idle => {
                self.state = CheckoutState::Idle;
                Ok(())
            }
            _ => Err(self.invalid("reset")),
        }
    }
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new(Money::from_cents(DEFAULT_CASH_LIMIT_CENTS))
    }
}

// =============================================================================
// Checkout Draft
// =============================================================================

/// What the cashier entered in the checkout dialog.
#[derive(Debug, Clone, Default)]
pub struct CheckoutParams {
    pub payment_method: PaymentMethod,
    pub cash_received: Money,
    pub customer_type: CustomerType,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
}

/// Server-assigned fields returned when a sale is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfirmation {
    pub id: String,
    pub transaction_number: String,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub cashier: Cashier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A priced, validated sale ready for submission.
///
/// ## Totals
/// - `subtotal` = Σ line gross (VAT-inclusive)
/// - `discount` = senior/PWD discount + exempted VAT
/// - `tax` = 0, shelf prices already include VAT
/// - `total` = subtotal − discount + tax
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDraft {
    /// Provisional id until the server assigns one.
    pub provisional_id: String,
    pub lines: Vec<CartItem>,
    pub discounts: DiscountContext,
    pub payment_method: PaymentMethod,
    pub cash_received: Money,
    pub customer_type: CustomerType,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
    pub change: Money,
}

impl CheckoutDraft {
    /// Prices the cart and validates the tender.
    ///
    /// ## Errors
    /// - `EmptyCart` with no lines
    /// - `InvalidTender` when cash is short of the total or above `cash_limit`
    /// - `Validation` for malformed customer name or notes
    pub fn build(
        cart: &Cart,
        params: CheckoutParams,
        policy: &DiscountPolicy,
        cash_limit: Money,
    ) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let notes = validate_notes(params.notes.as_deref())?;
        let customer_name = match params.customer_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(validate_customer_name(name)?),
            _ => None,
        };
        let customer_id = params
            .customer_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        let discounts = compute_discounts(params.customer_type, cart.items(), policy);
        let subtotal = cart.calculate_total();
        let discount = discounts.total_deduction();
        let tax = Money::zero();
        let total = subtotal - discount + tax;

        validate_cash_tender(params.cash_received, total, cash_limit).map_err(|e| {
            CoreError::InvalidTender {
                reason: e.to_string(),
            }
        })?;
        check_tender(total, params.cash_received, cash_limit)
            .map_err(|reason| CoreError::InvalidTender { reason })?;

        Ok(CheckoutDraft {
            provisional_id: Uuid::new_v4().to_string(),
            lines: cart.items().to_vec(),
            discounts,
            payment_method: params.payment_method,
            cash_received: params.cash_received,
            customer_type: params.customer_type,
            customer_id,
            customer_name,
            notes,
            subtotal,
            discount,
            tax,
            total,
            change: change_due(total, params.cash_received),
        })
    }

    /// Line items with their computed deductions.
    pub fn transaction_items(&self) -> Vec<TransactionItem> {
        self.lines
            .iter()
            .map(|line| {
                let deduction = self.discounts.line(&line.product_id);
                TransactionItem {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    unit_price_cents: line.unit_price_cents,
                    line_total_cents: line.line_total().cents(),
                    discount_applied: deduction.map_or(false, |d| d.discount_applied),
                    vat_exempt: deduction.map_or(false, |d| d.vat_exempt),
                    discount_amount_cents: deduction.map_or(0, |d| d.discount_amount.cents()),
                    vat_exempt_amount_cents: deduction
                        .map_or(0, |d| d.vat_exempt_amount.cents()),
                }
            })
            .collect()
    }

    /// Merges the server's confirmation into the local record.
    ///
    /// Server amounts win. Total and change are recomputed from them; change
    /// never goes below zero.
    pub fn confirm(self, confirmation: ServerConfirmation) -> Transaction {
        let items = self.transaction_items();
        let total = confirmation.subtotal - confirmation.discount + confirmation.tax;
        let change = change_due(total, self.cash_received).non_negative();

        Transaction {
            id: confirmation.id,
            transaction_number: confirmation.transaction_number,
            items,
            subtotal_cents: confirmation.subtotal.cents(),
            tax_cents: confirmation.tax.cents(),
            discount_cents: confirmation.discount.cents(),
            total_cents: total.cents(),
            payment_method: self.payment_method,
            cash_received_cents: self.cash_received.cents(),
            change_cents: change.cents(),
            cashier: confirmation.cashier,
            customer_type: self.customer_type,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            notes: self.notes,
            total_discount_amount_cents: self.discounts.total_discount_amount.cents(),
            total_vat_exempt_cents: self.discounts.total_vat_exempt.cents(),
            status: TransactionStatus::Completed,
            created_at: confirmation.created_at,
            updated_at: confirmation.updated_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
