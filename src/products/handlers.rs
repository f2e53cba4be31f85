use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    products::{
        dto::{
            CategoryResponse, CreateProductRequest, MessageResponse, ProductResponse,
            UpdateProductRequest, UploadImageResponse,
        },
        repo_types::Category,
        services::{self, NewProduct},
    },
    state::AppState,
    uploads,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/categories", get(list_categories))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/json", post(create_product_json))
        .route("/products/:id", put(update_product).delete(delete_product))
        .route("/products/upload-image", post(upload_image))
        .layer(DefaultBodyLimit::max(12 * 1024 * 1024))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products = services::list_products(&state).await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProductResponse>> {
    let product = services::get_product(&state, id).await?;
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let categories = Category::list(&state.db).await?;
    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

/// Multipart form: title, description, price, location, categoryId and an
/// optional `image` file, mirroring the browser upload form.
#[instrument(skip(state, multipart))]
pub async fn create_product(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    let mut title = None;
    let mut description = None;
    let mut price_raw = None;
    let mut location = None;
    let mut category_id_raw = None;
    let mut image: Option<(String, String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = Some(field.text().await.map_err(bad_multipart)?),
            "description" => description = Some(field.text().await.map_err(bad_multipart)?),
            "price" => price_raw = Some(field.text().await.map_err(bad_multipart)?),
            "location" => location = Some(field.text().await.map_err(bad_multipart)?),
            "categoryId" => category_id_raw = Some(field.text().await.map_err(bad_multipart)?),
            "image" => {
                let file_name = field.file_name().unwrap_or("upload.bin").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(bad_multipart)?;
                if !data.is_empty() {
                    image = Some((file_name, content_type, data));
                }
            }
            _ => {}
        }
    }

    let title = require_field(title, "title")?;
    let description = description.unwrap_or_default();
    let location = require_field(location, "location")?;
    let price: i32 = require_field(price_raw, "price")?
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation("price must be an integer".into()))?;
    let category_id: i64 = require_field(category_id_raw, "categoryId")?
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation("categoryId must be an integer".into()))?;

    let image_url = match image {
        Some((file_name, content_type, data)) => {
            let url = uploads::services::store_image(&state, &file_name, &content_type, data)
                .await?;
            info!(user = %username, image_url = %url, "product image uploaded");
            Some(url)
        }
        None => None,
    };

    let product = services::create_product(
        &state,
        NewProduct {
            title,
            description,
            price,
            location,
            category_id,
            image_url,
        },
        &username,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// JSON twin of the multipart registration, kept for API compatibility.
#[instrument(skip(state, payload))]
pub async fn create_product_json(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    let product = services::create_product(
        &state,
        NewProduct {
            title: payload.title,
            description: payload.description,
            price: payload.price,
            location: payload.location,
            category_id: payload.category_id,
            image_url: payload.image_url,
        },
        &username,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let product = services::update_product(&state, id, payload, &username).await?;
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    services::delete_product(&state, id, &username).await?;
    Ok(Json(MessageResponse {
        message: "product deleted".into(),
    }))
}

/// Standalone image upload; the returned path can be attached to a product
/// created later via the JSON endpoint.
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadImageResponse>> {
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(bad_multipart)?;

        let image_url =
            uploads::services::store_image(&state, &file_name, &content_type, data).await?;
        info!(user = %username, %image_url, "image uploaded");
        return Ok(Json(UploadImageResponse {
            image_url,
            uploaded_by: username,
        }));
    }

    Err(ApiError::Validation("image field is required".into()))
}

fn require_field(value: Option<String>, name: &str) -> ApiResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(format!("{name} is required")))
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::Validation(format!("invalid multipart body: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_field_rejects_missing_and_blank() {
        assert!(require_field(None, "title").is_err());
        assert!(require_field(Some("   ".into()), "title").is_err());
        assert_eq!(require_field(Some("ok".into()), "title").unwrap(), "ok");
    }
}
