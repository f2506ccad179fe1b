//! REST client for the cart and catalog backend.
//!
//! # Architecture
//!
//! - One `reqwest::Client` shared behind an `Arc`; clones are cheap
//! - Every request is bounded by its own timeout and fails with
//!   [`ApiError::Timeout`] naming the operation
//! - Non-2xx responses become [`ApiError::Api`] carrying the server's
//!   `message` field when it sends one
//! - No retries; callers decide what a failure means for their state
//!
//! # Endpoints
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | `GET` | `/api/carts` | [`ApiClient::list_carts`] |
//! | `POST` | `/api/carts` | [`ApiClient::create_cart`] |
//! | `GET` | `/api/carts/{cart_id}/items` | [`ApiClient::list_items`] |
//! | `POST` | `/api/carts/{cart_id}/items` | [`ApiClient::add_item`] |
//! | `PUT` | `/api/carts/{cart_id}/items/{product_id}` | [`ApiClient::update_item`] |
//! | `DELETE` | `/api/carts/{cart_id}/items/{product_id}` | [`ApiClient::remove_item`] |
//! | `GET` | `/api/products` | catalog search |
//! | `GET` | `/api/products/{product_id}` | catalog lookup |

mod conversions;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use cartwise_core::{CartId, CartLine, ProductId};

use crate::config::ClientConfig;
use crate::session::SessionToken;

pub use types::{CartItemRecord, CartRecord};
use types::{
    AddItemRequest, CartsResponse, CreatedCartResponse, ErrorBody, ItemsResponse,
    UpdateItemRequest,
};

/// Characters of a response body kept in logs and error messages.
const BODY_PREVIEW_CHARS: usize = 200;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out: {operation}")]
    Timeout { operation: &'static str },

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether this error is a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// HTTP status of a rejected request.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn from_reqwest(operation: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { operation }
        } else {
            Self::Http(err)
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the cart and catalog REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout)
            .user_agent(concat!("cartwise/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                timeout: config.request_timeout,
            }),
        })
    }

    /// Build `{base}/api/{segments...}`, percent-encoding each segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: Option<&SessionToken>) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token.bearer()),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn execute(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<String, ApiError> {
        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| ApiError::from_reqwest(operation, e))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| ApiError::from_reqwest(operation, e))?;
            Ok::<_, ApiError>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.inner.timeout, exchange)
            .await
            .map_err(|_| ApiError::Timeout { operation })??;

        if !status.is_success() {
            let message = server_message(status, &body);
            tracing::warn!(
                operation,
                status = %status,
                message = %message,
                "API returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    /// Send a request and parse the JSON body of a successful response.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
        token: Option<&SessionToken>,
    ) -> Result<T, ApiError> {
        let body = self
            .execute(operation, self.request(method, url, token))
            .await?;
        parse(operation, &body)
    }

    /// Send a JSON body and ignore the response body.
    async fn send_json<B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
        token: &SessionToken,
        body: &B,
    ) -> Result<(), ApiError> {
        let request = self.request(method, url, Some(token)).json(body);
        self.execute(operation, request).await.map(|_| ())
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// List the carts belonging to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out or is rejected.
    #[instrument(skip(self, token))]
    pub async fn list_carts(&self, token: &SessionToken) -> Result<Vec<CartRecord>, ApiError> {
        let url = self.endpoint(&["carts"])?;
        let response: CartsResponse = self
            .fetch("list carts", Method::GET, url, Some(token))
            .await?;
        debug!(count = response.carts.len(), "Fetched carts");
        Ok(response.carts)
    }

    /// Create a new cart for the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out or is rejected.
    #[instrument(skip(self, token))]
    pub async fn create_cart(&self, token: &SessionToken) -> Result<CartRecord, ApiError> {
        let url = self.endpoint(&["carts"])?;
        let request = self
            .request(Method::POST, url, Some(token))
            .json(&serde_json::json!({}));
        let body = self.execute("create cart", request).await?;
        let created: CreatedCartResponse = parse("create cart", &body)?;
        Ok(created.into())
    }

    /// Fetch the lines of a cart.
    ///
    /// Records with non-positive quantities are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out or is rejected.
    #[instrument(skip(self, token), fields(cart_id = %cart_id))]
    pub async fn list_items(
        &self,
        token: &SessionToken,
        cart_id: &CartId,
    ) -> Result<Vec<CartLine>, ApiError> {
        let url = self.endpoint(&["carts", cart_id.as_str(), "items"])?;
        let response: ItemsResponse = self
            .fetch("list cart items", Method::GET, url, Some(token))
            .await?;
        let lines = conversions::convert_items(response.into());
        debug!(count = lines.len(), "Fetched cart items");
        Ok(lines)
    }

    /// Add a quantity of a product to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out or is rejected.
    #[instrument(skip(self, token), fields(cart_id = %cart_id, product_id = %product_id))]
    pub async fn add_item(
        &self,
        token: &SessionToken,
        cart_id: &CartId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["carts", cart_id.as_str(), "items"])?;
        let body = AddItemRequest {
            product_id,
            quantity,
        };
        self.send_json("add cart item", Method::POST, url, token, &body)
            .await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out or is rejected.
    #[instrument(skip(self, token), fields(cart_id = %cart_id, product_id = %product_id))]
    pub async fn update_item(
        &self,
        token: &SessionToken,
        cart_id: &CartId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["carts", cart_id.as_str(), "items", product_id.as_str()])?;
        let body = UpdateItemRequest { quantity };
        self.send_json("update cart item", Method::PUT, url, token, &body)
            .await
    }

    /// Delete a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out or is rejected.
    #[instrument(skip(self, token), fields(cart_id = %cart_id, product_id = %product_id))]
    pub async fn remove_item(
        &self,
        token: &SessionToken,
        cart_id: &CartId,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["carts", cart_id.as_str(), "items", product_id.as_str()])?;
        let request = self.request(Method::DELETE, url, Some(token));
        self.execute("remove cart item", request).await.map(|_| ())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a JSON body, logging a preview of it on failure.
fn parse<T: DeserializeOwned>(operation: &'static str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            operation,
            error = %e,
            body = %preview(body),
            "Failed to parse API response"
        );
        ApiError::Parse(format!("{operation}: {e}"))
    })
}

/// Pick the most useful message out of an error response.
fn server_message(status: StatusCode, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .message
        .or(parsed.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            let text = preview(body);
            if text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                text
            }
        })
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
