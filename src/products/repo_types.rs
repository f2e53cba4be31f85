use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Product row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: i32,
    pub location: String,
    pub image_url: Option<String>,
    pub category_id: i64,
    pub seller_id: Uuid,
    pub created_at: OffsetDateTime,
}

/// Product joined with its seller's username and category name. The API only
/// ever exposes this projection, never the raw foreign keys.
#[derive(Debug, Clone, FromRow)]
pub struct ProductDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: i32,
    pub location: String,
    pub image_url: Option<String>,
    pub seller_username: String,
    pub category_name: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}
