//! Blob storage for book cover images.
//!
//! Uploaded covers are renamed to `{book_id}.{ext}` before they land in the
//! store, so the stored name never leaks the client's file name and a book
//! maps to exactly one cover file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Where cover images are written and how they are addressed afterwards.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<(), ServiceError>;
    /// Public URL the stored name is served from.
    fn url(&self, name: &str) -> String;
}

/// Normalize a client-supplied image name to `{id}.{ext}`.
///
/// The extension comes from the original file name when it carries one;
/// otherwise it is sniffed from the content. Either way the content must
/// sniff as an image, so a renamed executable does not make it into the
/// store.
pub fn format_image_name(original: &str, id: Uuid, bytes: &[u8]) -> Result<String, ServiceError> {
    models::book::validate_image(original)?;

    let kind = infer::get(bytes)
        .ok_or_else(|| ServiceError::Validation("image content is not a recognized format".into()))?;
    if !kind.mime_type().starts_with("image/") {
        return Err(ServiceError::Validation(format!(
            "unsupported content type: {}",
            kind.mime_type()
        )));
    }

    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| kind.extension().to_string());

    Ok(format!("{id}.{ext}"))
}

/// Filesystem-backed store; files land flat under the configured root.
#[derive(Clone)]
pub struct FsImageStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let mut base = public_base_url.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { root: root.into(), public_base_url: base }
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<(), ServiceError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ServiceError::Upload(e.to_string()))?;
        let path = self.root.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ServiceError::Upload(e.to_string()))?;
        debug!(path = %path.display(), size = bytes.len(), "image stored");
        Ok(())
    }

    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.public_base_url, name)
    }
}

/// In-memory store for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockImageStore {
        saved: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MockImageStore {
        pub fn saved_names(&self) -> Vec<String> {
            self.saved.lock().unwrap().keys().cloned().collect()
        }

        pub fn contains(&self, name: &str) -> bool {
            self.saved.lock().unwrap().contains_key(name)
        }
    }

    #[async_trait]
    impl ImageStore for MockImageStore {
        async fn save(&self, name: &str, bytes: &[u8]) -> Result<(), ServiceError> {
            self.saved.lock().unwrap().insert(name.to_string(), bytes.to_vec());
            Ok(())
        }

        fn url(&self, name: &str) -> String {
            format!("/images/{name}")
        }
    }

    /// Store that always fails, for exercising the abort-before-persist path.
    pub struct FailingImageStore;

    #[async_trait]
    impl ImageStore for FailingImageStore {
        async fn save(&self, _name: &str, _bytes: &[u8]) -> Result<(), ServiceError> {
            Err(ServiceError::Upload("store unavailable".into()))
        }

        fn url(&self, name: &str) -> String {
            format!("/images/{name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // PNG magic prefix is enough for content sniffing.
    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n0000";
    const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

    #[test]
    fn keeps_original_extension() {
        let id = Uuid::new_v4();
        let name = format_image_name("cover.PNG", id, PNG_BYTES).unwrap();
        assert_eq!(name, format!("{id}.png"));
    }

    #[test]
    fn sniffs_extension_when_name_has_none() {
        let id = Uuid::new_v4();
        let name = format_image_name("cover", id, JPEG_BYTES).unwrap();
        assert_eq!(name, format!("{id}.jpg"));
    }

    #[test]
    fn rejects_empty_name_and_non_image_content() {
        let id = Uuid::new_v4();
        assert!(matches!(
            format_image_name("", id, PNG_BYTES),
            Err(ServiceError::Model(_))
        ));
        assert!(matches!(
            format_image_name("cover.png", id, b"plain text, not an image"),
            Err(ServiceError::Validation(_))
        ));
        // ELF header sniffs, but not as an image
        let elf = [0x7F, 0x45, 0x4C, 0x46, 0x02, 0x01, 0x01, 0x00];
        assert!(matches!(
            format_image_name("cover.png", id, &elf),
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn fs_store_writes_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path(), "/images/");
        store.save("abc.png", PNG_BYTES).await.unwrap();
        let on_disk = std::fs::read(dir.path().join("abc.png")).unwrap();
        assert_eq!(on_disk, PNG_BYTES);
        assert_eq!(store.url("abc.png"), "/images/abc.png");
    }
}
