use sqlx::PgPool;
use uuid::Uuid;

use crate::products::repo_types::{Category, Product, ProductDetail};

const DETAIL_SELECT: &str = r#"
    SELECT p.id, p.title, p.description, p.price, p.location, p.image_url,
           u.username AS seller_username, c.name AS category_name, p.created_at
    FROM products p
    JOIN users u ON u.id = p.seller_id
    JOIN categories c ON c.id = p.category_id
"#;

impl Product {
    /// All products, newest first, joined with seller and category.
    pub async fn list(db: &PgPool) -> sqlx::Result<Vec<ProductDetail>> {
        sqlx::query_as::<_, ProductDetail>(&format!(
            "{DETAIL_SELECT} ORDER BY p.created_at DESC"
        ))
        .fetch_all(db)
        .await
    }

    pub async fn find_detail(db: &PgPool, id: i64) -> sqlx::Result<Option<ProductDetail>> {
        sqlx::query_as::<_, ProductDetail>(&format!("{DETAIL_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn insert(
        db: &PgPool,
        title: &str,
        description: &str,
        price: i32,
        location: &str,
        image_url: Option<&str>,
        category_id: i64,
        seller_id: Uuid,
    ) -> sqlx::Result<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (title, description, price, location, image_url, category_id, seller_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, price, location, image_url, category_id, seller_id, created_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(location)
        .bind(image_url)
        .bind(category_id)
        .bind(seller_id)
        .fetch_one(db)
        .await
    }

    /// Overwrites the mutable fields only; category and seller stay fixed.
    pub async fn update_fields(
        db: &PgPool,
        id: i64,
        title: &str,
        description: &str,
        price: i32,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE products
            SET title = $2, description = $3, price = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(price)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: i64) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

impl Category {
    pub async fn list(db: &PgPool) -> sqlx::Result<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id ASC")
            .fetch_all(db)
            .await
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn count(db: &PgPool) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(db)
            .await
    }

    pub async fn insert(db: &PgPool, name: &str) -> sqlx::Result<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(db)
        .await
    }
}
