use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

fn file_extension(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

fn has_allowed_extension(file_name: &str) -> bool {
    file_extension(file_name)
        .map(|ext| ext.to_ascii_lowercase())
        .map_or(false, |ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

fn validate_image(
    file_name: &str,
    content_type: &str,
    size: usize,
    max_bytes: usize,
) -> ApiResult<()> {
    if size == 0 {
        return Err(ApiError::Validation("empty file".into()));
    }
    if size > max_bytes {
        return Err(ApiError::Validation(format!(
            "file exceeds the maximum size of {}MB",
            max_bytes / 1024 / 1024
        )));
    }
    if !has_allowed_extension(file_name) {
        return Err(ApiError::Validation(format!(
            "file type not allowed, accepted: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    if !content_type.starts_with("image/") {
        return Err(ApiError::Validation("only image files can be uploaded".into()));
    }
    Ok(())
}

/// Collision-resistant name: `<8-hex>_<yyyymmdd_HHMMSS>.<ext>`.
fn unique_file_name(original: &str) -> String {
    let ext = file_extension(original)
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".into());
    let now = OffsetDateTime::now_utc();
    let stamp = format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    );
    let nonce = Uuid::new_v4().simple().to_string();
    format!("{}_{}.{}", &nonce[..8], stamp, ext)
}

/// Validates and persists one uploaded image, returning its reference path.
pub async fn store_image(
    state: &AppState,
    file_name: &str,
    content_type: &str,
    data: Bytes,
) -> ApiResult<String> {
    validate_image(file_name, content_type, data.len(), state.config.upload.max_bytes)?;

    let stored_name = unique_file_name(file_name);
    state.uploads.put(&stored_name, data).await?;

    info!(file = %stored_name, "image stored");
    Ok(format!("/uploads/{}", stored_name))
}

/// Best-effort removal of a previously stored image. Failure is logged and
/// never fails the owning operation.
pub async fn delete_image(state: &AppState, image_url: &str) {
    let Some(file_name) = image_url.strip_prefix("/uploads/") else {
        return;
    };
    if let Err(e) = state.uploads.delete(file_name).await {
        warn!(error = %e, %image_url, "failed to delete uploaded file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 10 * 1024 * 1024;

    #[test]
    fn rejects_empty_file() {
        let err = validate_image("photo.png", "image/png", 0, MAX).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn rejects_oversized_file() {
        let err = validate_image("photo.png", "image/png", MAX + 1, MAX).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn rejects_disallowed_extension() {
        let err = validate_image("malware.exe", "image/png", 100, MAX).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(validate_image("noextension", "image/png", 100, MAX).is_err());
    }

    #[test]
    fn rejects_non_image_content_type() {
        let err = validate_image("photo.png", "application/pdf", 100, MAX).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn accepts_valid_png() {
        assert!(validate_image("photo.png", "image/png", 100, MAX).is_ok());
        assert!(validate_image("PHOTO.JPG", "image/jpeg", 100, MAX).is_ok());
        assert!(validate_image("anim.webp", "image/webp", 100, MAX).is_ok());
    }

    #[test]
    fn unique_names_keep_extension_and_differ() {
        let a = unique_file_name("cat.PNG");
        let b = unique_file_name("cat.PNG");
        assert!(a.ends_with(".png"));
        assert!(b.ends_with(".png"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn store_image_returns_uploads_path() {
        let state = crate::state::AppState::fake();
        let url = store_image(&state, "photo.png", "image/png", Bytes::from_static(b"data"))
            .await
            .expect("store");
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));
    }

    #[tokio::test]
    async fn store_image_rejects_invalid_file() {
        let state = crate::state::AppState::fake();
        let err = store_image(&state, "tool.exe", "image/png", Bytes::from_static(b"data"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_image_ignores_foreign_paths() {
        let state = crate::state::AppState::fake();
        // no /uploads/ prefix, nothing to do, must not panic
        delete_image(&state, "https://cdn.example.com/x.png").await;
        delete_image(&state, "/uploads/gone.png").await;
    }
}
