//! Domain types for the external commerce API.
//!
//! Wire shapes follow the backend's REST payloads; every record here is
//! sourced from the API and never mutated by the client.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use lumiere_core::{CategoryId, CustomerId, ImageId, OrderId, Price, ProductId, StockStatus};

// =============================================================================
// Catalog Types
// =============================================================================

/// A product image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Image ID.
    pub id: ImageId,
    /// Image URL.
    pub src: String,
    /// Image name.
    pub name: String,
}

/// A category reference as embedded in a product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique, backend-assigned product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Current price (sale price when on sale).
    pub price: Price,
    /// Regular (non-sale) price.
    pub regular_price: Price,
    /// Sale price; unset (empty) when not on sale.
    pub sale_price: Price,
    /// Full description (may contain markup).
    pub description: String,
    /// Short description for listings.
    pub short_description: String,
    /// Product images.
    pub images: Vec<ProductImage>,
    /// Categories the product belongs to.
    pub categories: Vec<CategoryRef>,
    /// Stock status.
    pub stock_status: StockStatus,
    /// Average rating as a decimal string (e.g. "4.8").
    pub average_rating: String,
    /// Number of ratings.
    pub rating_count: i64,
}

impl Product {
    /// Whether the product is currently sold below its regular price.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.sale_price.is_set()
    }
}

/// Category image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryImage {
    /// Image URL.
    pub src: String,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique, backend-assigned category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Optional category image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<CategoryImage>,
    /// Number of published products in the category.
    pub count: i64,
}

// =============================================================================
// Customer & Session Types
// =============================================================================

/// A customer identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique, backend-assigned customer ID.
    pub id: CustomerId,
    /// Login username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
}

/// Registration payload for `POST /customers`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Response payload from the token endpoint.
///
/// The token is optional on the wire: some backends answer 200 without one.
/// Callers must treat a missing token as a failed login, never as success.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Opaque bearer token, when issued.
    pub token: Option<String>,
    /// Email of the authenticated user.
    #[serde(default)]
    pub user_email: String,
    /// URL-safe username of the authenticated user.
    #[serde(default)]
    pub user_nicename: String,
    /// Display name of the authenticated user.
    #[serde(default)]
    pub user_display_name: String,
}

// =============================================================================
// Order Types
// =============================================================================

/// A purchased line item within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// Product name at time of purchase.
    pub name: String,
    /// Units purchased.
    pub quantity: u32,
    /// Line total as a decimal string.
    pub total: Price,
}

/// A past order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique, backend-assigned order ID.
    pub id: OrderId,
    /// Order status (e.g. "processing", "completed").
    pub status: String,
    /// Order total as a decimal string.
    pub total: Price,
    /// Creation timestamp in the store's local time, as the backend reports
    /// it (no timezone on the wire).
    pub date_created: NaiveDateTime,
    /// Purchased line items.
    pub line_items: Vec<OrderLineItem>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_json() -> serde_json::Value {
        serde_json::json!({
            "id": 2,
            "name": "Velvet Rose Lipstick",
            "slug": "velvet-rose",
            "price": "28.00",
            "regular_price": "32.00",
            "sale_price": "28.00",
            "description": "Matte finish with long-lasting hydration.",
            "short_description": "Premium matte lipstick.",
            "images": [{"id": 102, "src": "https://cdn.example.com/lipstick.jpg", "name": "lipstick"}],
            "categories": [{"id": 10, "name": "Lipsticks", "slug": "lipsticks"}],
            "stock_status": "instock",
            "average_rating": "4.9",
            "rating_count": 85
        })
    }

    #[test]
    fn test_product_deserializes_from_wire_shape() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.id, ProductId::new(2));
        assert_eq!(product.stock_status, StockStatus::InStock);
        assert!(product.on_sale());
        assert_eq!(product.price.as_str(), "28.00");
    }

    #[test]
    fn test_product_without_sale_price_is_not_on_sale() {
        let mut json = product_json();
        json["sale_price"] = serde_json::json!("");
        let product: Product = serde_json::from_value(json).unwrap();
        assert!(!product.on_sale());
    }

    #[test]
    fn test_token_response_token_is_optional() {
        let resp: TokenResponse = serde_json::from_value(serde_json::json!({
            "user_email": "amira@example.com",
            "user_nicename": "amira",
            "user_display_name": "Amira"
        }))
        .unwrap();
        assert!(resp.token.is_none());
    }

    #[test]
    fn test_order_deserializes_from_wire_shape() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": 731,
            "status": "processing",
            "total": "83.00",
            "date_created": "2026-08-01T10:00:00",
            "line_items": [{"name": "Velvet Rose Lipstick", "quantity": 2, "total": "56.00"}]
        }))
        .unwrap();
        assert_eq!(order.id, OrderId::new(731));
        assert_eq!(order.line_items.len(), 1);
        assert_eq!(order.total.as_str(), "83.00");
    }

    #[test]
    fn test_category_image_optional() {
        let category: Category = serde_json::from_value(serde_json::json!({
            "id": 11, "name": "Skincare", "slug": "skincare", "count": 15
        }))
        .unwrap();
        assert!(category.image.is_none());
    }
}
