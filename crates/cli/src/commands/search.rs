//! Catalog search command.
//!
//! # Usage
//!
//! ```bash
//! cartwise search "dipirona" --vertical pharma
//! ```

use std::fmt::Write as _;

use tracing::instrument;

use cartwise_client::{ApiClient, CatalogClient, ClientConfig, Result};
use cartwise_core::{Product, Vertical};

/// Run a search and print one product per line.
///
/// # Errors
///
/// Returns an error if the API client cannot be built or the request fails.
#[allow(clippy::print_stdout)]
#[instrument(skip(config))]
pub async fn run(config: &ClientConfig, query: &str, vertical: Option<Vertical>) -> Result<()> {
    let catalog = CatalogClient::new(ApiClient::new(config)?, config);
    let products = catalog.search(query, vertical).await?;
    tracing::debug!(count = products.len(), "Search finished");

    print!("{}", format_results(&products));
    Ok(())
}

/// Render search results as a plain-text table.
pub fn format_results(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products found.\n".to_string();
    }

    let mut out = String::new();
    for product in products {
        let id = product.usable_id().map_or("-", |id| id.as_str());
        let price = product
            .price
            .map_or_else(|| "n/a".to_string(), |price| price.to_string());
        let _ = write!(out, "{id:<12} {price:>10}  {}", product.name);
        if let Some(brand) = &product.brand {
            let _ = write!(out, " ({brand})");
        }
        if let Some(store) = &product.store {
            let _ = write!(out, " @ {store}");
        }
        out.push('\n');
    }
    out
}
