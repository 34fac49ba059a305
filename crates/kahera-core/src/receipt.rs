//! # Receipt Composer
//!
//! Turns a confirmed transaction into a printable, fixed-width receipt.
//! Printing itself belongs to the host.
//!
//! ## Layout
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            SARI-SARI NI ALING NENA       │  store header
//! │ Txn #: TXN-000123                        │
//! │ ID: 12a3c4f5          Cashier: Maria     │
//! │ *** SENIOR CITIZEN ***                   │  non-regular only
//! │ Gatas 1L                                 │
//! │   1 x ₱112.00                   ₱112.00  │
//! │   Less VAT exempt               -₱12.00  │  sub-lines
//! │   Less 20% discount             -₱20.00  │
//! │ Subtotal                        ₱112.00  │
//! │ VATable sales / VAT   (regular)          │
//! │ Less VAT exempt / discount (senior, PWD) │
//! │ TOTAL                            ₱80.00  │
//! │ Cash / Change                            │
//! └──────────────────────────────────────────┘
//! ```

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Rate, Transaction};
use crate::vat::{compute_vat_at, VatBreakdown};

/// Narrowest paper the renderer will lay out for.
pub const MIN_PAPER_WIDTH: usize = 24;

/// Philippine Standard Time, UTC+8.
const STORE_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Store details printed in the receipt header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub name: String,
    pub address: Option<String>,
    /// BIR taxpayer identification number.
    pub tin: Option<String>,
    pub currency_symbol: String,
}

impl Default for StoreInfo {
    fn default() -> Self {
        StoreInfo {
            name: "Kahera POS".to_string(),
            address: None,
            tin: None,
            currency_symbol: "₱".to_string(),
        }
    }
}

/// One item on the receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
    pub vat_exempt: Option<Money>,
    pub discount: Option<Money>,
}

/// Bottom section of the receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptSummary {
    /// Regular customer: VAT contained in the total.
    Vat(VatBreakdown),
    /// Senior/PWD customer: deductions taken.
    Discount {
        label: String,
        vat_exempt: Money,
        discount: Money,
    },
}

/// A composed receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub store: StoreInfo,
    pub transaction_number: String,
    pub short_id: String,
    pub cashier_name: String,
    pub timestamp: DateTime<Utc>,
    /// Classification banner, only for senior/PWD sales.
    pub customer_banner: Option<String>,
    pub customer_name: Option<String>,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Money,
    pub summary: ReceiptSummary,
    pub total: Money,
    pub cash_received: Money,
    pub change: Money,
}

impl Receipt {
    /// Composes a receipt from a confirmed transaction.
    pub fn from_transaction(tx: &Transaction, store: &StoreInfo, vat_rate: Rate) -> Self {
        let lines = tx
            .items
            .iter()
            .map(|item| ReceiptLine {
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price(),
                line_total: item.line_total(),
                vat_exempt: item
                    .vat_exempt
                    .then(|| Money::from_cents(item.vat_exempt_amount_cents)),
                discount: item
                    .discount_applied
                    .then(|| Money::from_cents(item.discount_amount_cents)),
            })
            .collect();

        let summary = match tx.customer_type.discount_label() {
            Some(label) => ReceiptSummary::Discount {
                label: label.to_string(),
                vat_exempt: Money::from_cents(tx.total_vat_exempt_cents),
                discount: Money::from_cents(tx.total_discount_amount_cents),
            },
            None => ReceiptSummary::Vat(compute_vat_at(tx.total(), vat_rate)),
        };

        Receipt {
            store: store.clone(),
            transaction_number: tx.transaction_number.clone(),
            short_id: tx.short_id().to_string(),
            cashier_name: tx.cashier.name.clone(),
            timestamp: tx.created_at,
            customer_banner: tx.customer_type.discount_label().map(str::to_string),
            customer_name: tx.customer_name.clone(),
            lines,
            subtotal: tx.subtotal(),
            summary,
            total: tx.total(),
            cash_received: tx.cash_received(),
            change: tx.change(),
        }
    }

    /// Renders the receipt as plain text for paper `width` characters wide.
    pub fn render(&self, width: usize) -> String {
        let mut out = Printer {
            width: width.max(MIN_PAPER_WIDTH),
            symbol: &self.store.currency_symbol,
            buf: String::new(),
        };

        out.center(&self.store.name.to_uppercase());
        if let Some(address) = &self.store.address {
            out.center(address);
        }
        if let Some(tin) = &self.store.tin {
            out.center(&format!("TIN: {}", tin));
        }
        out.rule('=');

        out.line(&format!("Txn #: {}", self.transaction_number));
        out.columns(&format!("ID: {}", self.short_id), &format!("Cashier: {}", self.cashier_name));
        out.line(&format!("Date: {}", local_time(self.timestamp)));

        if let Some(banner) = &self.customer_banner {
            out.rule('-');
            out.center(&format!("*** {} ***", banner));
            if let Some(name) = &self.customer_name {
                out.line(&format!("Name: {}", name));
            }
        }
        out.rule('-');

        for line in &self.lines {
            out.line(&line.name);
            out.columns(
                &format!("  {} x {}", line.quantity, out.amount(line.unit_price)),
                &out.amount(line.line_total),
            );
            if let Some(exempt) = line.vat_exempt {
                out.columns("  Less VAT exempt", &out.amount(-exempt));
            }
            if let Some(discount) = line.discount {
                out.columns("  Less discount", &out.amount(-discount));
            }
        }
        out.rule('-');

        out.columns("Subtotal", &out.amount(self.subtotal));
        match &self.summary {
            ReceiptSummary::Vat(vat) => {
                out.columns("VATable sales", &out.amount(vat.net_sales));
                out.columns(
                    &format!("VAT ({}%)", vat.vat_rate.percentage()),
                    &out.amount(vat.vat_amount),
                );
            }
            ReceiptSummary::Discount {
                label,
                vat_exempt,
                discount,
            } => {
                out.columns("Less VAT exempt", &out.amount(-*vat_exempt));
                out.columns(&format!("Less {} discount", label), &out.amount(-*discount));
            }
        }
        out.rule('=');

        out.columns("TOTAL", &out.amount(self.total));
        out.columns("Cash", &out.amount(self.cash_received));
        out.columns("Change", &out.amount(self.change));
        out.rule('=');
        out.center("Thank you for shopping!");

        out.buf
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(STORE_UTC_OFFSET_SECS) {
        Some(tz) => at.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(),
        None => at.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}

struct Printer<'a> {
    width: usize,
    symbol: &'a str,
    buf: String,
}

impl Printer<'_> {
    fn amount(&self, m: Money) -> String {
        let sign = if m.is_negative() { "-" } else { "" };
        format!("{}{}{}.{:02}", sign, self.symbol, m.pesos().abs(), m.cents_part())
    }

    fn line(&mut self, text: &str) {
        self.buf.push_str(&truncate(text, self.width));
        self.buf.push('\n');
    }

    fn center(&mut self, text: &str) {
        let text = truncate(text, self.width);
        let pad = (self.width - text.chars().count()) / 2;
        self.buf.push_str(&" ".repeat(pad));
        self.buf.push_str(&text);
        self.buf.push('\n');
    }

    fn rule(&mut self, ch: char) {
        self.buf.extend(std::iter::repeat(ch).take(self.width));
        self.buf.push('\n');
    }

    /// Left text and right-aligned value on one line. The left side is
    /// truncated to keep the value intact.
    fn columns(&mut self, left: &str, right: &str) {
        let right_len = right.chars().count();
        let room = self.width.saturating_sub(right_len + 1);
        let left = truncate(left, room);
        let gap = self.width.saturating_sub(left.chars().count() + right_len).max(1);

        self.buf.push_str(&left);
        self.buf.push_str(&" ".repeat(gap));
        self.buf.push_str(right);
        self.buf.push('\n');
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
