use serde::{Deserialize, Serialize};

use super::catalog_resource;
use crate::repository::ClientView;

/// A product listed in the shop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Name of the category this product is shown under
    pub category: String,
    pub price: i64,
    pub origin_price: i64,
    pub unit: String,
    pub description: String,
    pub content: String,
    pub is_enabled: bool,
    pub image_url: String,
}

catalog_resource!(Product, collection = "products", kind = "Product");

/// Product as shown to shoppers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub origin_price: i64,
    pub unit: String,
    pub description: String,
    pub content: String,
    pub image_url: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            category: product.category,
            price: product.price,
            origin_price: product.origin_price,
            unit: product.unit,
            description: product.description,
            content: product.content,
            image_url: product.image_url,
        }
    }
}

impl ClientView for Product {
    type View = ProductView;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_default() {
        let product: Product = serde_json::from_value(json!({"name": "Latte", "price": 120})).unwrap();
        assert_eq!(product.price, 120);
        assert_eq!(product.origin_price, 0);
        assert!(!product.is_enabled);
    }

    #[test]
    fn test_view_drops_enabled_flag() {
        let product = Product {
            id: "p1".into(),
            name: "Latte".into(),
            is_enabled: true,
            ..Product::default()
        };
        let view = serde_json::to_value(ProductView::from(product)).unwrap();
        assert_eq!(view["id"], "p1");
        assert!(view.get("is_enabled").is_none());
    }
}
