//! # `kahera checkout`
//!
//! Runs a full cash sale from a cart file and prints the receipt.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart.json ──► load products ──► build cart (clamp to stock)            │
//! │                                        │                                │
//! │                  clamped and not --accept-adjustments ──► error         │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                            validate_cart_stock ── drift ──► error       │
//! │                                        │                                │
//! │                                        ▼                                │
//! │  CheckoutFlow: select cash ─► enter cash ─► begin_submit                │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                  TransactionSubmitter::complete_transaction             │
//! │                         │                          │                    │
//! │                   Ok: complete             Err: submit_failed           │
//! │                         │                          │                    │
//! │                         ▼                          ▼                    │
//! │                  print receipt           print reason, exit non-zero    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kahera_client::CheckoutError;
use kahera_core::{
    CheckoutDraft, CheckoutFlow, CheckoutParams, Money, PaymentMethod, Receipt, Transaction,
};
use serde::Serialize;
use tracing::{info, warn};

use super::{print_json, CheckoutArgs};
use crate::cart_file::{build_cart, read_cart_file, CartLine, LoadedCart};
use crate::context::Register;
use crate::error::{AppError, AppResult, ErrorCode};

/// A confirmed sale and the quantities that were reduced to fit stock.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    pub transaction: Transaction,
    pub adjustments: Vec<String>,
}

/// Prices, validates and submits the cart described by `lines`.
///
/// A line that had to be reduced to the stock on hand stops the sale unless
/// `accept_adjustments` is set; nothing is submitted in that case.
pub async fn checkout(
    lines: &[CartLine],
    params: CheckoutParams,
    accept_adjustments: bool,
    register: &Register,
) -> AppResult<CheckoutOutcome> {
    register.load_products().await?;
    let LoadedCart {
        mut cart,
        adjustments,
    } = build_cart(lines, &*register.catalog.read().await)?;
    if !adjustments.is_empty() {
        if !accept_adjustments {
            return Err(AppError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Cart exceeds stock on hand ({}). \
                     Re-run with --accept-adjustments to sell the reduced quantities",
                    adjustments.join("; ")
                ),
            ));
        }
        for note in &adjustments {
            warn!(adjustment = %note, "Selling reduced quantity");
        }
    }

    let validation = register.validator().validate_cart_stock(&mut cart).await?;
    if !validation.valid {
        return Err(CheckoutError::StaleStock {
            issues: validation.issues,
        }
        .into());
    }

    let mut flow = CheckoutFlow::new(register.config.cash_limit());
    flow.select_payment(params.payment_method)?;
    flow.enter_cash(params.cash_received)?;

    let policy = register.config.discount_policy()?;
    let draft = CheckoutDraft::build(&cart, params, &policy, flow.cash_limit())?;
    flow.begin_submit(draft.total)?;

    match register
        .submitter()
        .complete_transaction(&mut cart, draft)
        .await
    {
        Ok(transaction) => {
            flow.complete(transaction.clone())?;
            register.submitter().wait_for_refresh().await;
            Ok(CheckoutOutcome {
                transaction,
                adjustments,
            })
        }
        Err(err) => {
            flow.submit_failed()?;
            if err.requires_cart_review() {
                for item in cart.items() {
                    info!(
                        product = %item.name,
                        in_cart = item.quantity,
                        available = item.stock_ceiling,
                        "Cart line after refresh"
                    );
                }
            }
            Err(err.into())
        }
    }
}

pub async fn run(args: CheckoutArgs, register: &Register, json: bool) -> AppResult<()> {
    if !args.cash.is_finite() {
        return Err(AppError::validation("Cash must be a number"));
    }

    let lines = read_cart_file(&args.cart)?;
    let params = CheckoutParams {
        payment_method: PaymentMethod::Cash,
        cash_received: Money::from_major_f64(args.cash),
        customer_type: args.customer,
        customer_id: args.customer_id,
        customer_name: args.customer_name,
        notes: args.notes,
    };

    let outcome = checkout(&lines, params, args.accept_adjustments, register).await?;

    if json {
        return print_json(&outcome);
    }

    for note in &outcome.adjustments {
        println!("adjusted: {}", note);
    }
    let receipt = Receipt::from_transaction(
        &outcome.transaction,
        &register.config.store_info(),
        register.config.vat_rate(),
    );
    print!("{}", receipt.render(register.config.receipt.paper_width));
    Ok(())
}
