//! Product catalog queries.
//!
//! Search results and product lookups are cached with `moka` for the
//! configured TTL (5 minutes by default). Catalog endpoints are public; no
//! session token is sent.

mod cache;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::Method;
use tracing::{debug, instrument};

use cartwise_core::{Product, ProductId, Vertical};

use crate::api::types::{ProductResponse, ProductsResponse};
use crate::api::{ApiClient, ApiError};
use crate::config::ClientConfig;

use cache::{CacheKey, CacheValue};

/// Client for product search and lookup.
#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a catalog client on top of an API client.
    #[must_use]
    pub fn new(api: ApiClient, config: &ClientConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Self { api, cache }
    }

    /// Search products, optionally restricted to one vertical.
    ///
    /// Blank queries return an empty list without a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out or is rejected.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(
        &self,
        query: &str,
        vertical: Option<Vertical>,
    ) -> Result<Arc<Vec<Product>>, ApiError> {
        let normalized = cache::normalize_query(query);
        if normalized.is_empty() {
            return Ok(Arc::new(Vec::new()));
        }
        let key = CacheKey::Search {
            query: normalized.clone(),
            vertical,
        };

        // Check cache
        if let Some(CacheValue::Products(products)) = self.cache.get(&key).await {
            debug!("Cache hit for search");
            return Ok(products);
        }

        let mut url = self.api.endpoint(&["products"])?;
        url.query_pairs_mut().append_pair("q", &normalized);
        if let Some(vertical) = vertical {
            url.query_pairs_mut()
                .append_pair("vertical", vertical.as_str());
        }

        let response: ProductsResponse = self
            .api
            .fetch("search products", Method::GET, url, None)
            .await?;
        let products = Arc::new(Vec::<Product>::from(response));
        debug!(count = products.len(), "Fetched search results");

        self.cache
            .insert(key, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Look up a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with status 404 if the product does not
    /// exist, or another error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(product_id.clone());

        // Check cache
        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.api.endpoint(&["products", product_id.as_str()])?;
        let response: ProductResponse = self
            .api
            .fetch("get product", Method::GET, url, None)
            .await?;
        let mut product = Product::from(response);
        if product.usable_id().is_none() {
            product.id = Some(product_id.clone());
        }

        self.cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
