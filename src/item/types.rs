use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stock sentinel meaning "effectively unlimited".
pub const UNLIMITED_STOCK: u32 = 999;

/// Fields with a typed slot on [`Item`]. Everything else is metadata.
const TYPED_FIELDS: &[&str] = &["id", "name", "price", "quantity", "stock", "inStock", "image"];

/// One product line in a cart, wishlist or comparison set.
///
/// Always produced by [`sanitize`](super::sanitize), so the numeric fields
/// already satisfy `price >= 0` and `1 <= quantity <= stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    /// URL or asset handle. Not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub stock: u32,
    pub in_stock: bool,
    /// Category, brand, badge, description, discount and any unknown field.
    /// Carried through unmodified.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Item {
    /// `price * quantity`.
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    /// Look up a string metadata field such as `"brand"` or `"category"`.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// Loosely typed item record as received from a consumer or from storage.
///
/// Only `id`, `name` and `price` are required; numeric fields may hold any
/// value and are coerced by [`sanitize`](super::sanitize).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: Option<f64>,
    pub stock: Option<f64>,
    pub in_stock: Option<bool>,
    pub image: Option<String>,
    pub metadata: Map<String, Value>,
}

impl RawItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            ..Default::default()
        }
    }

    pub fn quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn stock(mut self, stock: f64) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Attach a descriptive field. Names of typed fields (`price`,
    /// `quantity`, ...) are ignored; use the matching builder method.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if TYPED_FIELDS.contains(&key.as_str()) {
            tracing::debug!(key = %key, "Ignoring metadata that shadows a typed field");
            return self;
        }
        self.metadata.insert(key, value.into());
        self
    }

    /// Extract a record from an arbitrary JSON value.
    ///
    /// Returns `None` unless the value is an object with a string `id`,
    /// a string `name` and a numeric `price`. Other typed fields are read
    /// when they have the expected JSON type and ignored otherwise.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = obj.get("id")?.as_str()?;
        let name = obj.get("name")?.as_str()?;
        let price = obj.get("price")?.as_f64()?;

        let image = obj.get("image").and_then(Value::as_str);

        let metadata = obj
            .iter()
            .filter(|(key, value)| {
                // A non-string image is still an opaque handle worth keeping.
                !TYPED_FIELDS.contains(&key.as_str()) || (*key == "image" && !value.is_string())
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Some(Self {
            id: id.to_string(),
            name: name.to_string(),
            price,
            quantity: obj.get("quantity").and_then(Value::as_f64),
            stock: obj.get("stock").and_then(Value::as_f64),
            in_stock: obj.get("inStock").and_then(Value::as_bool),
            image: image.map(str::to_string),
            metadata,
        })
    }
}

impl From<&Item> for RawItem {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity: Some(f64::from(item.quantity)),
            stock: Some(f64::from(item.stock)),
            in_stock: Some(item.in_stock),
            image: item.image.clone(),
            metadata: item.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_requires_id_name_and_price() {
        assert!(RawItem::from_value(&json!({"id": "a", "name": "X", "price": 1})).is_some());
        assert!(RawItem::from_value(&json!({"id": 1, "name": "X", "price": 1})).is_none());
        assert!(RawItem::from_value(&json!({"id": "a", "price": 1})).is_none());
        assert!(RawItem::from_value(&json!({"id": "a", "name": "X", "price": "10"})).is_none());
        assert!(RawItem::from_value(&json!("a")).is_none());
        assert!(RawItem::from_value(&json!(null)).is_none());
    }

    #[test]
    fn from_value_keeps_unknown_fields_as_metadata() {
        let raw = RawItem::from_value(&json!({
            "id": "p1",
            "name": "Paracetamol 500mg",
            "price": 35.5,
            "brand": "Calpol",
            "discount": 10,
            "inStock": false
        }))
        .unwrap();

        assert_eq!(raw.in_stock, Some(false));
        assert_eq!(raw.metadata.get("brand"), Some(&json!("Calpol")));
        assert_eq!(raw.metadata.get("discount"), Some(&json!(10)));
        assert!(!raw.metadata.contains_key("inStock"));
    }

    #[test]
    fn from_value_ignores_mistyped_optional_fields() {
        let raw = RawItem::from_value(&json!({
            "id": "p1",
            "name": "Syrup",
            "price": 80,
            "quantity": "three",
            "stock": null,
            "image": {"asset": 42}
        }))
        .unwrap();

        assert_eq!(raw.quantity, None);
        assert_eq!(raw.stock, None);
        assert_eq!(raw.image, None);
        assert_eq!(raw.metadata.get("image"), Some(&json!({"asset": 42})));
    }

    #[test]
    fn item_serializes_camel_case_and_flattens_metadata() {
        let item = Item {
            id: "a".to_string(),
            name: "X".to_string(),
            price: 10.0,
            quantity: 2,
            image: None,
            stock: 5,
            in_stock: true,
            metadata: [("badge".to_string(), json!("New"))].into_iter().collect(),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["inStock"], json!(true));
        assert_eq!(value["badge"], json!("New"));
        assert!(value.get("image").is_none());
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let item = Item {
            id: "a".to_string(),
            name: "X".to_string(),
            price: 12.5,
            quantity: 4,
            image: None,
            stock: 10,
            in_stock: true,
            metadata: Map::new(),
        };
        assert_eq!(item.line_total(), 50.0);
        assert_eq!(item.meta_str("brand"), None);
    }

    #[test]
    fn meta_ignores_typed_field_names() {
        let raw = RawItem::new("a", "X", 10.0)
            .quantity(2.0)
            .meta("price", 999)
            .meta("quantity", 7)
            .meta("inStock", false)
            .meta("brand", "Acme");

        assert_eq!(raw.price, 10.0);
        assert_eq!(raw.quantity, Some(2.0));
        assert_eq!(raw.metadata.len(), 1);
        assert_eq!(raw.metadata.get("brand"), Some(&json!("Acme")));

        let value = serde_json::to_value(crate::item::sanitize(raw)).unwrap();
        let reparsed = RawItem::from_value(&value).unwrap();
        assert_eq!(reparsed.price, 10.0);
        assert_eq!(reparsed.quantity, Some(2.0));
    }
}
