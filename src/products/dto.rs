use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::products::repo_types::{Category, ProductDetail};

/// JSON body for `POST /api/products/json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub title: String,
    pub description: String,
    pub price: i32,
    pub location: String,
    pub category_id: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// JSON body for `PUT /api/products/{id}`. Category and seller are not
/// mutable through this path.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub title: String,
    pub description: String,
    pub price: i32,
}

/// Product projection returned to clients: seller and category appear by
/// name only, never as raw records.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: i32,
    pub location: String,
    pub image_url: Option<String>,
    pub seller_username: String,
    pub category_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<ProductDetail> for ProductResponse {
    fn from(d: ProductDetail) -> Self {
        Self {
            id: d.id,
            title: d.title,
            description: d.description,
            price: d.price,
            location: d.location,
            image_url: d.image_url,
            seller_username: d.seller_username,
            category_name: d.category_name,
            created_at: d.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self { id: c.id, name: c.name }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    pub image_url: String,
    pub uploaded_by: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn product_response_uses_camel_case_keys() {
        let response = ProductResponse {
            id: 1,
            title: "iPhone 14 Pro".into(),
            description: "barely used".into(),
            price: 850_000,
            location: "Gangnam, Seoul".into(),
            image_url: Some("/uploads/abc.png".into()),
            seller_username: "alice".into(),
            category_name: "Electronics".into(),
            created_at: datetime!(2025-01-01 12:00 UTC),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"sellerUsername\":\"alice\""));
        assert!(json.contains("\"categoryName\":\"Electronics\""));
        assert!(json.contains("\"imageUrl\":\"/uploads/abc.png\""));
        assert!(json.contains("\"createdAt\":\"2025-01-01T12:00:00Z\""));
    }

    #[test]
    fn create_request_accepts_camel_case_keys() {
        let req: CreateProductRequest = serde_json::from_str(
            r#"{"title":"t","description":"d","price":10,"location":"l","categoryId":1}"#,
        )
        .unwrap();
        assert_eq!(req.category_id, 1);
        assert!(req.image_url.is_none());
    }
}
