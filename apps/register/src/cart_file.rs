//! # Cart Files
//!
//! The register reads the cart to check out from a JSON file:
//!
//! ```json
//! [
//!   { "productId": "665f1c2ab7e4d90012a3c4f5", "quantity": 2 },
//!   { "productId": "665f1c2ab7e4d90012a3c4f6", "quantity": 1 }
//! ]
//! ```
//!
//! Lines are resolved against the freshly loaded product catalog and added
//! through the same cart rules the touch screen uses, so a quantity above
//! the known stock is clamped rather than rejected.

use std::path::Path;

use kahera_client::ProductCatalog;
use kahera_core::{Cart, QuantityOutcome};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AppError, AppResult};

/// One requested line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Parses a cart file's contents.
pub fn parse_cart(json: &str) -> AppResult<Vec<CartLine>> {
    let lines: Vec<CartLine> = serde_json::from_str(json)?;
    if lines.is_empty() {
        return Err(AppError::validation("Cart file has no lines"));
    }
    if let Some(line) = lines.iter().find(|l| l.quantity < 1) {
        return Err(AppError::validation(format!(
            "Quantity for {} must be at least 1",
            line.product_id
        )));
    }
    Ok(lines)
}

pub fn read_cart_file(path: &Path) -> AppResult<Vec<CartLine>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::input(format!("Cannot read {}: {}", path.display(), e)))?;
    parse_cart(&contents)
}

/// Cart built from a file, with any quantities that had to be reduced.
#[derive(Debug)]
pub struct LoadedCart {
    pub cart: Cart,
    pub adjustments: Vec<String>,
}

/// Adds every line to a new cart. Repeated product ids accumulate.
pub fn build_cart(lines: &[CartLine], catalog: &ProductCatalog) -> AppResult<LoadedCart> {
    let mut cart = Cart::new();
    let mut adjustments = Vec::new();

    for line in lines {
        let product = catalog
            .get(&line.product_id)
            .ok_or_else(|| AppError::not_found("Product", &line.product_id))?;

        let current = match cart.get(&product.id) {
            Some(item) => item.quantity,
            None => {
                cart.add_to_cart(product)?;
                0
            }
        };

        let requested = current + line.quantity;
        if requested > 1 {
            if let QuantityOutcome::ClampedToStock { requested, applied } =
                cart.update_quantity(&product.id, requested)?
            {
                warn!(product = %product.name, requested, applied, "Quantity clamped to stock");
                adjustments.push(format!(
                    "{}: only {} of {} added",
                    product.name, applied, requested
                ));
            }
        }
    }

    Ok(LoadedCart { cart, adjustments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::product;

    fn catalog() -> ProductCatalog {
        let mut catalog = ProductCatalog::new();
        catalog.replace(vec![product("a", 1000, 5), product("b", 2500, 2)]);
        catalog
    }

    #[test]
    fn test_parse_defaults_quantity() {
        let lines = parse_cart(r#"[{"productId":"a"},{"productId":"b","quantity":3}]"#).unwrap();
        assert_eq!(lines[0].quantity, 1);
        assert_eq!(lines[1].quantity, 3);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(parse_cart("[]").unwrap_err().code, ErrorCode::ValidationError);
        assert_eq!(
            parse_cart(r#"[{"productId":"a","quantity":0}]"#).unwrap_err().code,
            ErrorCode::ValidationError
        );
        assert_eq!(parse_cart("not json").unwrap_err().code, ErrorCode::InputError);
    }

    #[test]
    fn test_read_cart_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, r#"[{"productId":"a","quantity":2}]"#).unwrap();

        let lines = read_cart_file(&path).unwrap();
        assert_eq!(lines, vec![CartLine { product_id: "a".into(), quantity: 2 }]);

        let missing = read_cart_file(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(missing.code, ErrorCode::InputError);
    }

    #[test]
    fn test_build_cart_accumulates_and_clamps() {
        let lines = parse_cart(
            r#"[
                {"productId": "a", "quantity": 2},
                {"productId": "a", "quantity": 1},
                {"productId": "b", "quantity": 4}
            ]"#,
        )
        .unwrap();

        let loaded = build_cart(&lines, &catalog()).unwrap();

        assert_eq!(loaded.cart.item_count(), 2);
        assert_eq!(loaded.cart.get("a").unwrap().quantity, 3);
        assert_eq!(loaded.cart.get("b").unwrap().quantity, 2);
        assert_eq!(loaded.adjustments, vec!["Product b: only 2 of 4 added".to_string()]);
    }

    #[test]
    fn test_build_cart_unknown_product() {
        let lines = vec![CartLine {
            product_id: "zzz".into(),
            quantity: 1,
        }];
        let err = build_cart(&lines, &catalog()).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
