//! Integration tests for Cartwise.
//!
//! Every test stands up a `wiremock` server playing the backend, so no real
//! network traffic is made.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartwise-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `remote_cart` - Session lifecycle, sync and mutations
//! - `catalog` - Product search and lookup caching

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cartwise_client::{ApiClient, ClientConfig, SessionToken};

/// Raw token the mock backend expects.
pub const TEST_TOKEN: &str = "test-session-token";

/// `Authorization` header value for [`TEST_TOKEN`].
pub const TEST_BEARER: &str = "Bearer test-session-token";

/// Client configuration pointing at a mock server.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid URL.
#[must_use]
pub fn config_for(server: &MockServer) -> ClientConfig {
    let url = server.uri().parse().expect("mock server URI is a valid URL");
    ClientConfig::new(url).with_request_timeout(Duration::from_secs(5))
}

/// API client pointing at a mock server.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn api_for(config: &ClientConfig) -> ApiClient {
    ApiClient::new(config).expect("failed to build test ApiClient")
}

/// The session token the mock backend accepts.
#[must_use]
pub fn token() -> SessionToken {
    SessionToken::new(TEST_TOKEN)
}

/// `GET /api/carts` body listing the given cart ids.
#[must_use]
pub fn carts_json(cart_ids: &[&str]) -> Value {
    let carts: Vec<Value> = cart_ids
        .iter()
        .map(|id| json!({"cart_id": id, "created_at": "2026-01-05T12:00:00Z"}))
        .collect();
    json!({ "carts": carts })
}

/// A flat cart item record.
#[must_use]
pub fn item_json(product_id: &str, name: &str, price: &str, quantity: i64) -> Value {
    json!({
        "product_id": product_id,
        "quantity": quantity,
        "name": name,
        "price": price,
        "store": "Mercado Central"
    })
}

/// `GET /api/carts/{id}/items` body.
#[must_use]
pub fn items_json(items: Vec<Value>) -> Value {
    json!({ "items": items })
}

/// Mount `GET /api/carts` returning the given cart ids.
pub async fn mount_carts(server: &MockServer, cart_ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/api/carts"))
        .and(header("authorization", TEST_BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(carts_json(cart_ids)))
        .mount(server)
        .await;
}

/// Mount `GET /api/carts/{cart_id}/items` returning `items` for at most
/// `times` calls, or forever when `times` is `None`.
pub async fn mount_items(
    server: &MockServer,
    cart_id: &str,
    items: Vec<Value>,
    times: Option<u64>,
) {
    let mock = Mock::given(method("GET"))
        .and(path(format!("/api/carts/{cart_id}/items")))
        .and(header("authorization", TEST_BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(items_json(items)));
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}
