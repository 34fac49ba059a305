//! `kahera products`: lists products available for sale.

use kahera_core::Product;

use super::{print_json, ProductsArgs};
use crate::context::Register;
use crate::error::AppResult;

/// Loads the catalog and applies the listing filters.
pub async fn list(args: &ProductsArgs, register: &Register) -> AppResult<Vec<Product>> {
    register.load_products().await?;
    let catalog = register.catalog.read().await;

    let products = if args.low_stock {
        catalog.low_stock().into_iter().cloned().collect()
    } else {
        catalog.products().to_vec()
    };
    Ok(products)
}

pub async fn run(args: ProductsArgs, register: &Register, json: bool) -> AppResult<()> {
    let products = list(&args, register).await?;
    if json {
        return print_json(&products);
    }

    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    println!("{:<14} {:<28} {:>12} {:>7}", "SKU", "NAME", "PRICE", "STOCK");
    for p in &products {
        let flag = if p.is_low_stock() { " !" } else { "" };
        println!(
            "{:<14} {:<28} {:>12} {:>7}{}",
            p.sku,
            p.name,
            p.price().to_string(),
            p.stock,
            flag
        );
    }
    Ok(())
}
