//! Conversions from wire records into core cart types.

use cartwise_core::{CartLine, Product};
use tracing::warn;

use super::types::CartItemRecord;

/// Convert a server item record into a cart line.
///
/// Returns `None` for records whose quantity is not a positive `u32`; the
/// server is the source of truth but a non-positive line has no meaning in a
/// cart.
pub(crate) fn convert_item(record: CartItemRecord) -> Option<CartLine> {
    let Ok(quantity) = u32::try_from(record.quantity) else {
        warn!(
            product_id = %record.product_id,
            quantity = record.quantity,
            "Dropping cart item with out-of-range quantity"
        );
        return None;
    };
    if quantity == 0 {
        warn!(product_id = %record.product_id, "Dropping cart item with zero quantity");
        return None;
    }

    let product = match record.product {
        Some(mut product) => {
            // The line's product id wins over whatever the nested payload says.
            product.id = Some(record.product_id);
            product
        }
        None => Product {
            name: record
                .name
                .unwrap_or_else(|| record.product_id.to_string()),
            id: Some(record.product_id),
            brand: record.brand,
            image_url: record.image_url,
            price: record.price,
            store: record.store,
            unit: record.unit,
            health_score: record.health_score,
            vertical: None,
        },
    };

    Some(CartLine { product, quantity })
}

/// Convert a list of item records, dropping invalid ones.
pub(crate) fn convert_items(records: Vec<CartItemRecord>) -> Vec<CartLine> {
    records.into_iter().filter_map(convert_item).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartwise_core::{Price, ProductId};
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> CartItemRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_convert_flat_record() {
        let line = convert_item(record(json!({
            "product_id": 123,
            "quantity": 2,
            "name": "Cafe 500g",
            "price": 14.90,
            "store": "Mercado Sol",
            "unit": "un"
        })))
        .unwrap();

        assert_eq!(line.quantity, 2);
        assert_eq!(line.product.id, Some(ProductId::new("123")));
        assert_eq!(line.product.name, "Cafe 500g");
        assert_eq!(line.product.price, Some(Price::from_cents(1490)));
        assert_eq!(line.product.store.as_deref(), Some("Mercado Sol"));
    }

    #[test]
    fn test_convert_nested_record_uses_line_product_id() {
        let line = convert_item(record(json!({
            "productId": "p-1",
            "quantity": 1,
            "product": { "id": "other", "name": "Fone Bluetooth", "price": "199.00" }
        })))
        .unwrap();

        assert_eq!(line.product.id, Some(ProductId::new("p-1")));
        assert_eq!(line.product.name, "Fone Bluetooth");
    }

    #[test]
    fn test_convert_missing_name_falls_back_to_id() {
        let line = convert_item(record(json!({ "product_id": 77, "quantity": 1 }))).unwrap();
        assert_eq!(line.product.name, "77");
        assert!(line.product.price.is_none());
    }

    #[test]
    fn test_convert_drops_non_positive_quantities() {
        assert!(convert_item(record(json!({ "product_id": 1, "quantity": 0 }))).is_none());
        assert!(convert_item(record(json!({ "product_id": 1, "quantity": -3 }))).is_none());
    }

    #[test]
    fn test_convert_keeps_lines_with_bad_health_scores() {
        let flat = convert_item(record(json!({
            "product_id": 1,
            "quantity": 1,
            "health_score": 300
        })))
        .unwrap();
        assert!(flat.product.health_score.is_none());

        let nested = convert_item(record(json!({
            "product_id": 2,
            "quantity": 1,
            "product": { "name": "Granola", "health_score": 7.5 }
        })))
        .unwrap();
        assert_eq!(nested.product.health_score, Some(rust_decimal::Decimal::new(75, 1)));
    }

    #[test]
    fn test_convert_items_filters() {
        let lines = convert_items(vec![
            record(json!({ "product_id": 1, "quantity": 1 })),
            record(json!({ "product_id": 2, "quantity": 0 })),
        ]);
        assert_eq!(lines.len(), 1);
    }
}
