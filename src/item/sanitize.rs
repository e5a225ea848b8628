//! Coercion of loosely typed item records. Nothing here fails: malformed
//! numbers are replaced by safe defaults.

use serde_json::Value;

use super::types::{Item, RawItem, UNLIMITED_STOCK};

/// Normalize a raw record into an [`Item`].
///
/// - `price`: `max(0, price)` when finite, otherwise 0
/// - `stock`: floored when finite and at least 1, otherwise [`UNLIMITED_STOCK`]
/// - `quantity`: `floor(quantity or 1)` clamped to `[1, stock]`
/// - `in_stock`: defaults to `true`
pub fn sanitize(raw: RawItem) -> Item {
    let stock = sanitize_stock(raw.stock);
    let quantity = clamp_quantity(raw.quantity.unwrap_or(1.0), stock);

    Item {
        id: raw.id,
        name: raw.name,
        price: sanitize_price(raw.price),
        quantity,
        image: raw.image,
        stock,
        in_stock: raw.in_stock.unwrap_or(true),
        metadata: raw.metadata,
    }
}

pub fn sanitize_price(price: f64) -> f64 {
    if price.is_finite() {
        price.max(0.0)
    } else {
        0.0
    }
}

pub fn sanitize_stock(stock: Option<f64>) -> u32 {
    match stock {
        Some(stock) if stock.is_finite() && stock >= 1.0 => {
            stock.floor().min(f64::from(u32::MAX)) as u32
        }
        _ => UNLIMITED_STOCK,
    }
}

/// Floor `quantity` and clamp it to `[1, stock]`. Zero and NaN count as 1.
pub fn clamp_quantity(quantity: f64, stock: u32) -> u32 {
    let ceiling = stock.max(1);
    let quantity = if quantity.is_nan() || quantity == 0.0 {
        1.0
    } else {
        quantity.floor()
    };

    if quantity < 1.0 {
        1
    } else if quantity >= f64::from(ceiling) {
        ceiling
    } else {
        quantity as u32
    }
}

/// Integer variant of [`clamp_quantity`] for quantity updates.
pub fn clamp_to_stock(quantity: i64, stock: u32) -> u32 {
    quantity.clamp(1, i64::from(stock.max(1))) as u32
}

/// Turn an arbitrary deserialized value into a list of items.
///
/// A non-array yields an empty list. Entries without a string `id`, a
/// string `name` and a numeric `price` are dropped; the rest are sanitized.
pub fn validate_list(raw: &Value) -> Vec<Item> {
    let Some(entries) = raw.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(RawItem::from_value)
        .map(sanitize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_coercion() {
        assert_eq!(sanitize_price(120.0), 120.0);
        assert_eq!(sanitize_price(-5.0), 0.0);
        assert_eq!(sanitize_price(f64::NAN), 0.0);
        assert_eq!(sanitize_price(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_stock_defaults_to_sentinel() {
        assert_eq!(sanitize_stock(None), UNLIMITED_STOCK);
        assert_eq!(sanitize_stock(Some(0.0)), UNLIMITED_STOCK);
        assert_eq!(sanitize_stock(Some(-3.0)), UNLIMITED_STOCK);
        assert_eq!(sanitize_stock(Some(f64::NAN)), UNLIMITED_STOCK);
        assert_eq!(sanitize_stock(Some(0.5)), UNLIMITED_STOCK);
        assert_eq!(sanitize_stock(Some(7.9)), 7);
    }

    #[test]
    fn test_quantity_clamp() {
        assert_eq!(clamp_quantity(0.0, 5), 1);
        assert_eq!(clamp_quantity(f64::NAN, 5), 1);
        assert_eq!(clamp_quantity(-4.0, 5), 1);
        assert_eq!(clamp_quantity(2.7, 5), 2);
        assert_eq!(clamp_quantity(10.0, 5), 5);
        assert_eq!(clamp_quantity(f64::INFINITY, 5), 5);
        assert_eq!(clamp_quantity(0.4, 5), 1);
    }

    #[test]
    fn test_integer_clamp() {
        assert_eq!(clamp_to_stock(-1, 5), 1);
        assert_eq!(clamp_to_stock(0, 5), 1);
        assert_eq!(clamp_to_stock(3, 5), 3);
        assert_eq!(clamp_to_stock(i64::MAX, 5), 5);
        assert_eq!(clamp_to_stock(3, 0), 1);
    }

    #[test]
    fn test_sanitize_defaults() {
        let item = sanitize(RawItem::new("a", "Vitamin C", 250.0));
        assert_eq!(item.quantity, 1);
        assert_eq!(item.stock, UNLIMITED_STOCK);
        assert!(item.in_stock);
    }

    #[test]
    fn test_sanitize_clamps_quantity_to_stock() {
        let item = sanitize(RawItem::new("a", "X", 10.0).quantity(8.0).stock(3.0));
        assert_eq!(item.quantity, 3);
        assert_eq!(item.stock, 3);
    }

    #[test]
    fn test_validate_list_non_array() {
        assert!(validate_list(&json!({"id": "a"})).is_empty());
        assert!(validate_list(&json!("[]")).is_empty());
        assert!(validate_list(&json!(null)).is_empty());
    }

    #[test]
    fn test_validate_list_filters_and_sanitizes() {
        let raw = json!([
            {"id": "a", "name": "X", "price": -10, "quantity": 0},
            {"id": "b", "name": "Y"},
            42,
            "text",
            {"id": "c", "name": "Z", "price": 5, "stock": 2, "quantity": 9}
        ]);
        let items = validate_list(&raw);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[0].price, 0.0);
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[1].id, "c");
        assert_eq!(items[1].quantity, 2);
    }
}
