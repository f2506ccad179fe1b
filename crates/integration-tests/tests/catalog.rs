//! Integration tests for `CatalogClient` search and lookup.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cartwise_client::{ApiError, CatalogClient};
use cartwise_core::{Price, ProductId, Vertical};
use cartwise_integration_tests::{api_for, config_for};

fn catalog(server: &MockServer) -> CatalogClient {
    let config = config_for(server);
    CatalogClient::new(api_for(&config), &config)
}

#[tokio::test]
async fn test_search_is_cached_per_normalized_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("q", "arroz integral"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                {
                    "id": 10,
                    "name": "Arroz Integral 1kg",
                    "price": "8.99",
                    "platform": "Mercado Central"
                },
                {"id": 11, "name": "Arroz Integral 5kg", "price": "32.50"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog(&server);
    let first = catalog.search("arroz integral", None).await.unwrap();
    let second = catalog.search("  Arroz   INTEGRAL ", None).await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    let top = first.first().unwrap();
    assert_eq!(top.usable_id(), Some(&ProductId::new("10")));
    assert_eq!(top.price, Some(Price::from_cents(899)));
    assert_eq!(top.store.as_deref(), Some("Mercado Central"));
}

#[tokio::test]
async fn test_search_sends_vertical() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("q", "dipirona"))
        .and(query_param("vertical", "pharma"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "p1", "name": "Dipirona 500mg", "vertical": "pharma"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = catalog(&server)
        .search("dipirona", Some(Vertical::Pharma))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results.first().unwrap().vertical, Some(Vertical::Pharma));
}

#[tokio::test]
async fn test_blank_search_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let results = catalog(&server).search("   ", None).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_product_lookup_fills_missing_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Fone Bluetooth",
            "price": "199.90"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog(&server);
    let product = catalog.product(&ProductId::new("42")).await.unwrap();
    assert_eq!(product.usable_id(), Some(&ProductId::new("42")));

    // Served from cache
    let again = catalog.product(&ProductId::new("42")).await.unwrap();
    assert_eq!(product, again);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;

    let err = catalog(&server)
        .product(&ProductId::new("missing"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(matches!(err, ApiError::Api { .. }));
}
