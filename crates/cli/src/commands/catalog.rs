//! Catalog management: seeding products from YAML and listing them.
//!
//! # Seed file format
//!
//! ```yaml
//! products:
//!   - name: Desk Lamp
//!     price: "19.99"
//!     image: lamp.jpg
//!     description: Warm white, dimmable.
//!   - name: Notebook
//!     price: "4.50"
//! ```
//!
//! The whole file is parsed and validated before connecting to the database,
//! and the products are inserted in one transaction, so a bad entry never
//! leaves a half-seeded catalog. Prices must fit the catalog column exactly:
//! more than two decimal places is an error, not a rounding.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use minishop_core::{NewProduct, ProductError};
use minishop_storefront::db::ProductRepository;

/// Top-level shape of a seed file.
#[derive(Debug, Deserialize)]
struct CatalogSeed {
    products: Vec<NewProduct>,
}

/// Errors from reading a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Could not read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Seed file has no products")]
    Empty,

    #[error("{count} invalid product(s) in seed file")]
    Invalid { count: usize },
}

/// Parse and validate seed file contents.
///
/// Every invalid entry is logged with its position before failing.
fn parse_seed(content: &str) -> Result<Vec<NewProduct>, SeedError> {
    let seed: CatalogSeed = serde_yaml::from_str(content)?;
    if seed.products.is_empty() {
        return Err(SeedError::Empty);
    }

    let errors: Vec<(usize, &NewProduct, ProductError)> = seed
        .products
        .iter()
        .enumerate()
        .filter_map(|(index, product)| {
            product
                .validate()
                .err()
                .map(|e| (index + 1, product, e))
        })
        .collect();

    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for (position, product, err) in &errors {
            error!("  - product #{position} ({:?}): {err}", product.name);
        }
        return Err(SeedError::Invalid {
            count: errors.len(),
        });
    }

    Ok(seed.products)
}

/// Seed the catalog from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or if an insert fails.
pub async fn seed(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::NotFound(file_path.to_string()).into());
    }

    info!(path = %file_path, "Loading catalog seed");
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse_seed(&content)?;
    info!(products = products.len(), "Seed file validated");

    let pool = super::connect().await?;
    let inserted = ProductRepository::new(&pool).insert_all(&products).await?;

    for product in &inserted {
        info!(id = %product.id, name = %product.name, price = %product.price, "Inserted product");
    }
    info!("Seeding complete! {} product(s) inserted", inserted.len());
    Ok(())
}

/// Print every product in the catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let products = ProductRepository::new(&pool).list_all().await?;

    #[allow(clippy::print_stdout)]
    {
        if products.is_empty() {
            println!("Catalog is empty. Seed it with: minishop catalog seed <file.yaml>");
        }
        for product in &products {
            println!("{:>6}  {:>10}  {}", product.id, product.price, product.name);
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_reads_products() {
        let products = parse_seed(
            r#"
products:
  - name: Desk Lamp
    price: "19.99"
    image: lamp.jpg
  - name: Notebook
    price: "4.50"
    description: Dotted, A5.
"#,
        )
        .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Desk Lamp");
        assert_eq!(products[0].image.as_deref(), Some("lamp.jpg"));
        assert_eq!(products[1].price.to_string(), "4.50");
        assert_eq!(products[1].description.as_deref(), Some("Dotted, A5."));
    }

    #[test]
    fn test_parse_seed_rejects_non_positive_price() {
        let result = parse_seed(
            r#"
products:
  - name: Freebie
    price: "0"
"#,
        );
        assert!(matches!(result, Err(SeedError::Yaml(_))));
    }

    #[test]
    fn test_parse_seed_rejects_blank_name() {
        let result = parse_seed(
            r#"
products:
  - name: "  "
    price: "1.00"
"#,
        );
        assert!(matches!(result, Err(SeedError::Invalid { count: 1 })));
    }

    #[test]
    fn test_parse_seed_rejects_prices_the_catalog_would_change() {
        let result = parse_seed(
            r#"
products:
  - name: Pencil
    price: "4.999"
  - name: Yacht
    price: "100000000.00"
  - name: Notebook
    price: "4.50"
"#,
        );
        assert!(matches!(result, Err(SeedError::Invalid { count: 2 })));
    }

    #[test]
    fn test_parse_seed_rejects_empty_list() {
        assert!(matches!(
            parse_seed("products: []"),
            Err(SeedError::Empty)
        ));
    }
}
