//! # Kahera Register
//!
//! Command-line front end for the Kahera POS checkout core.
//!
//! ## Commands
//! - `kahera vat <amount>` - VAT breakdown of a VAT-inclusive amount
//! - `kahera products` - List products available for sale
//! - `kahera validate --cart cart.json` - Check a cart against live stock
//! - `kahera checkout --cart cart.json --cash 500` - Complete a cash sale
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap)                                              │
//! │  2. Initialize tracing (RUST_LOG, stderr)                               │
//! │  3. Load PosConfig (file → KAHERA_* environment → validate)             │
//! │  4. Connect HttpBackend (backend commands only)                         │
//! │  5. Run the command; on error print "[CODE] message" and exit           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart_file;
mod commands;
mod context;
mod error;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kahera_client::PosConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::{CheckoutArgs, ProductsArgs, ValidateArgs, VatArgs};
use context::Register;
use error::AppResult;

/// Kahera POS register
#[derive(Parser)]
#[command(name = "kahera")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file path (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the VAT breakdown of an amount
    Vat(VatArgs),

    /// List products available for sale
    Products(ProductsArgs),

    /// Check a cart file against current inventory
    Validate(ValidateArgs),

    /// Complete a cash sale and print the receipt
    Checkout(CheckoutArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    let json = cli.json;
    if let Err(err) = run(cli).await {
        if json {
            match serde_json::to_string(&err) {
                Ok(body) => eprintln!("{}", body),
                Err(_) => eprintln!("{}", err),
            }
        } else {
            eprintln!("{}", err);
        }
        std::process::exit(err.code.exit_code());
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = PosConfig::load(cli.config)?;
    debug!(api = %config.api.base_url, "Configuration loaded");

    match cli.command {
        Commands::Vat(args) => commands::vat::run(args, &config, cli.json),
        Commands::Products(args) => {
            let register = Register::connect(config)?;
            commands::products::run(args, &register, cli.json).await
        }
        Commands::Validate(args) => {
            let register = Register::connect(config)?;
            commands::validate::run(args, &register, cli.json).await
        }
        Commands::Checkout(args) => {
            let register = Register::connect(config)?;
            commands::checkout::run(args, &register, cli.json).await
        }
    }
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=kahera_client=trace` - Trace backend calls and events
/// - Default: `warn`, with debug output from the register itself
///
/// Logs go to stderr so receipts and JSON on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn,kahera_register=debug,kahera_client=info")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
