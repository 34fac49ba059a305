//! `kahera vat`: splits a VAT-inclusive amount into net sales and VAT.

use kahera_client::PosConfig;
use kahera_core::{compute_vat, Money, VatBreakdown};

use super::{print_json, VatArgs};
use crate::error::{AppError, AppResult};

/// Computes the breakdown at the requested or configured rate.
pub fn breakdown(args: &VatArgs, config: &PosConfig) -> AppResult<VatBreakdown> {
    if !args.amount.is_finite() {
        return Err(AppError::validation("Amount must be a number"));
    }
    let rate = args.rate.unwrap_or(config.pricing.vat_rate_percent);
    Ok(compute_vat(Money::from_major_f64(args.amount), rate))
}

pub fn run(args: VatArgs, config: &PosConfig, json: bool) -> AppResult<()> {
    let b = breakdown(&args, config)?;
    if json {
        return print_json(&b);
    }

    println!("Total (VAT incl.)  {:>14}", b.total.to_string());
    println!("Net sales          {:>14}", b.net_sales.to_string());
    println!(
        "VAT {:>5.2}%         {:>14}",
        b.vat_rate.percentage(),
        b.vat_amount.to_string()
    );
    Ok(())
}
