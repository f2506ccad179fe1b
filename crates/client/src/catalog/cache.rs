//! Cache types for catalog responses.

use std::sync::Arc;

use cartwise_core::{Product, ProductId, Vertical};

/// Cache key for searches and single products.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Search {
        query: String,
        vertical: Option<Vertical>,
    },
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
}

/// Lowercase and collapse whitespace.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  Leite   Integral "), "leite integral");
        assert_eq!(normalize_query(""), "");
    }

    #[test]
    fn test_search_keys_distinguish_vertical() {
        let key = |vertical| CacheKey::Search {
            query: normalize_query("ARROZ  tipo 1"),
            vertical,
        };
        assert_eq!(key(None), key(None));
        assert_ne!(key(None), key(Some(Vertical::Supermarket)));
    }
}
