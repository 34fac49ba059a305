//! Register subcommands.

use std::path::PathBuf;

use clap::Args;
use kahera_core::CustomerType;

pub mod checkout;
pub mod products;
pub mod validate;
pub mod vat;

/// Arguments for `kahera vat`.
#[derive(Args, Debug)]
pub struct VatArgs {
    /// VAT-inclusive amount in pesos
    pub amount: f64,

    /// VAT rate in percent (defaults to the configured rate)
    #[arg(long)]
    pub rate: Option<f64>,
}

/// Arguments for `kahera products`.
#[derive(Args, Debug)]
pub struct ProductsArgs {
    /// Only list products at or below their reorder level
    #[arg(long)]
    pub low_stock: bool,
}

/// Arguments for `kahera validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Cart file (JSON list of productId/quantity)
    #[arg(long)]
    pub cart: PathBuf,
}

/// Arguments for `kahera checkout`.
#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// Cart file (JSON list of productId/quantity)
    #[arg(long)]
    pub cart: PathBuf,

    /// Cash tendered in pesos
    #[arg(long)]
    pub cash: f64,

    /// Customer classification: regular, senior or pwd
    #[arg(long, default_value = "regular")]
    pub customer: CustomerType,

    /// Senior citizen / PWD ID number
    #[arg(long)]
    pub customer_id: Option<String>,

    #[arg(long)]
    pub customer_name: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Sell lines reduced to the stock on hand instead of stopping
    #[arg(long)]
    pub accept_adjustments: bool,
}

/// Prints `value` as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> crate::error::AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
