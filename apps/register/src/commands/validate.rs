//! `kahera validate`: checks a cart file against live inventory.

use kahera_client::{CheckoutError, StockValidation};
use kahera_core::CartTotals;
use serde::Serialize;

use super::{print_json, ValidateArgs};
use crate::cart_file::{build_cart, read_cart_file, CartLine, LoadedCart};
use crate::context::Register;
use crate::error::AppResult;

/// Result printed by `kahera validate`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub totals: CartTotals,
    pub adjustments: Vec<String>,
    #[serde(flatten)]
    pub stock: StockValidation,
}

/// Builds the cart from `lines` and runs the stock check.
pub async fn validate_lines(
    lines: &[CartLine],
    register: &Register,
) -> AppResult<ValidationReport> {
    register.load_products().await?;
    let LoadedCart {
        mut cart,
        adjustments,
    } = build_cart(lines, &*register.catalog.read().await)?;

    let stock = register.validator().validate_cart_stock(&mut cart).await?;
    Ok(ValidationReport {
        totals: CartTotals::from(&cart),
        adjustments,
        stock,
    })
}

pub async fn run(args: ValidateArgs, register: &Register, json: bool) -> AppResult<()> {
    let lines = read_cart_file(&args.cart)?;
    let report = validate_lines(&lines, register).await?;

    if json {
        print_json(&report)?;
    } else {
        for note in &report.adjustments {
            println!("adjusted: {}", note);
        }
        println!(
            "{} lines, {} items, total {}",
            report.totals.item_count, report.totals.total_quantity, report.totals.total
        );
        if report.stock.valid {
            println!("Stock OK");
        }
    }

    if report.stock.valid {
        Ok(())
    } else {
        Err(CheckoutError::StaleStock {
            issues: report.stock.issues,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use kahera_client::PosConfig;

    use crate::test_support::{product, StubBackend};

    fn line(id: &str, quantity: i64) -> CartLine {
        CartLine {
            product_id: id.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_valid_cart_report() {
        let backend = StubBackend::new(vec![product("a", 1000, 5), product("b", 2500, 3)]);
        let register = Register::with_backend(PosConfig::default(), Arc::new(backend));

        let report = validate_lines(&[line("a", 2), line("b", 1)], &register)
            .await
            .unwrap();

        assert!(report.stock.valid);
        assert_eq!(report.totals.total_quantity, 3);
        assert_eq!(report.totals.total.cents(), 4500);
        assert!(report.adjustments.is_empty());
    }

    #[tokio::test]
    async fn test_report_serializes_errors() {
        let backend = StubBackend::new(vec![product("a", 1000, 2)]);
        let register = Register::with_backend(PosConfig::default(), Arc::new(backend));

        let report = validate_lines(&[line("a", 5)], &register).await.unwrap();
        assert!(report.stock.valid);
        assert_eq!(report.adjustments.len(), 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["totals"]["totalQuantity"], 2);
    }
}
