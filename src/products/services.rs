use tracing::info;

use crate::auth::repo_types::User;
use crate::error::{ApiError, ApiResult};
use crate::products::dto::{ProductResponse, UpdateProductRequest};
use crate::products::repo_types::{Category, Product, ProductDetail};
use crate::state::AppState;
use crate::uploads;

pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: i32,
    pub location: String,
    pub category_id: i64,
    pub image_url: Option<String>,
}

fn validate_fields(title: &str, location: Option<&str>, price: i32) -> ApiResult<()> {
    if title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }
    if let Some(location) = location {
        if location.trim().is_empty() {
            return Err(ApiError::Validation("location is required".into()));
        }
    }
    if price < 0 {
        return Err(ApiError::Validation("price must be non-negative".into()));
    }
    Ok(())
}

/// Only the recorded seller may mutate or delete a product.
fn ensure_owner(product: &ProductDetail, requesting_username: &str) -> ApiResult<()> {
    if product.seller_username != requesting_username {
        return Err(ApiError::Forbidden(format!(
            "product belongs to '{}'",
            product.seller_username
        )));
    }
    Ok(())
}

pub async fn create_product(
    state: &AppState,
    new: NewProduct,
    seller_username: &str,
) -> ApiResult<ProductResponse> {
    validate_fields(&new.title, Some(&new.location), new.price)?;

    let seller = User::find_by_username(&state.db, seller_username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("seller '{seller_username}' not found")))?;

    let category = Category::find_by_id(&state.db, new.category_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("category not found".into()))?;

    let product = Product::insert(
        &state.db,
        &new.title,
        &new.description,
        new.price,
        &new.location,
        new.image_url.as_deref(),
        category.id,
        seller.id,
    )
    .await?;

    info!(product_id = product.id, seller = %seller.username, "product created");
    Ok(ProductResponse {
        id: product.id,
        title: product.title,
        description: product.description,
        price: product.price,
        location: product.location,
        image_url: product.image_url,
        seller_username: seller.username,
        category_name: category.name,
        created_at: product.created_at,
    })
}

pub async fn list_products(state: &AppState) -> ApiResult<Vec<ProductResponse>> {
    let rows = Product::list(&state.db).await?;
    Ok(rows.into_iter().map(ProductResponse::from).collect())
}

pub async fn get_product(state: &AppState, id: i64) -> ApiResult<ProductResponse> {
    let detail = Product::find_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;
    Ok(ProductResponse::from(detail))
}

pub async fn update_product(
    state: &AppState,
    id: i64,
    req: UpdateProductRequest,
    requesting_username: &str,
) -> ApiResult<ProductResponse> {
    validate_fields(&req.title, None, req.price)?;

    let current = Product::find_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;
    ensure_owner(&current, requesting_username)?;

    Product::update_fields(&state.db, id, &req.title, &req.description, req.price).await?;

    info!(product_id = id, user = %requesting_username, "product updated");
    Ok(ProductResponse::from(ProductDetail {
        title: req.title,
        description: req.description,
        price: req.price,
        ..current
    }))
}

pub async fn delete_product(
    state: &AppState,
    id: i64,
    requesting_username: &str,
) -> ApiResult<()> {
    let current = Product::find_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;
    ensure_owner(&current, requesting_username)?;

    Product::delete(&state.db, id).await?;

    if let Some(image_url) = &current.image_url {
        uploads::services::delete_image(state, image_url).await;
    }

    info!(product_id = id, user = %requesting_username, "product deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn detail(seller: &str) -> ProductDetail {
        ProductDetail {
            id: 1,
            title: "MacBook Air M2".into(),
            description: "six months of use".into(),
            price: 1_200_000,
            location: "Seocho, Seoul".into(),
            image_url: None,
            seller_username: seller.into(),
            category_name: "Electronics".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn owner_may_mutate() {
        assert!(ensure_owner(&detail("alice"), "alice").is_ok());
    }

    #[test]
    fn non_owner_is_forbidden() {
        let err = ensure_owner(&detail("alice"), "bob").unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = validate_fields("title", Some("loc"), -1).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = validate_fields("  ", Some("loc"), 10).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn zero_price_is_allowed() {
        assert!(validate_fields("free couch", Some("loc"), 0).is_ok());
    }
}
