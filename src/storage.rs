use std::io::ErrorKind;
use std::path::PathBuf;

use axum::async_trait;
use bytes::Bytes;
use tokio::fs;

/// Persistence seam for uploaded files.
#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn put(&self, file_name: &str, data: Bytes) -> std::io::Result<()>;
    async fn delete(&self, file_name: &str) -> std::io::Result<()>;
}

/// Stores uploads on the local filesystem under a configured directory.
#[derive(Clone)]
pub struct LocalUploads {
    root: PathBuf,
}

impl LocalUploads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { root: dir.into() }
    }
}

#[async_trait]
impl UploadStore for LocalUploads {
    async fn put(&self, file_name: &str, data: Bytes) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await?;
        fs::write(self.root.join(file_name), &data).await
    }

    async fn delete(&self, file_name: &str) -> std::io::Result<()> {
        match fs::remove_file(self.root.join(file_name)).await {
            Ok(()) => Ok(()),
            // already gone counts as deleted
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("secondhand-market-test-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn put_then_delete_roundtrip() {
        let root = temp_root();
        let store = LocalUploads::new(&root);

        store
            .put("photo.png", Bytes::from_static(b"fake image bytes"))
            .await
            .expect("put should succeed");
        assert!(root.join("photo.png").exists());

        store.delete("photo.png").await.expect("delete should succeed");
        assert!(!root.join("photo.png").exists());

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    #[tokio::test]
    async fn delete_of_missing_file_is_ok() {
        let root = temp_root();
        let store = LocalUploads::new(&root);
        assert!(store.delete("never-existed.jpg").await.is_ok());
    }
}
