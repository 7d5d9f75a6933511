//! Local media store for submitted product images.
//!
//! Uploaded files land in the configured uploads directory and are served
//! back under `/uploads/`. After storing a file its public URL is probed with
//! an HTTP HEAD request; a submission is aborted if the stored asset is not
//! retrievable, so a request row never points at a dead image.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{instrument, warn};
use uuid::Uuid;

/// Timeout for the post-upload accessibility probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Accepted image content types, mapped to the stored file extension.
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// Errors storing or verifying an uploaded image.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The uploaded part had a content type we do not store.
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    /// The uploaded part carried no bytes.
    #[error("uploaded image is empty")]
    Empty,

    /// Writing the file failed.
    #[error("failed to write upload: {0}")]
    Io(#[from] std::io::Error),

    /// The stored asset did not answer the accessibility probe.
    #[error("uploaded image is not retrievable at {0}")]
    NotRetrievable(String),
}

/// Stores uploads on local disk and verifies they are reachable.
#[derive(Clone)]
pub struct MediaStore {
    uploads_dir: PathBuf,
    client: reqwest::Client,
}

impl MediaStore {
    /// Create a store rooted at `uploads_dir`, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Io` if the directory cannot be created.
    pub fn new(uploads_dir: PathBuf) -> Result<Self, MediaError> {
        std::fs::create_dir_all(&uploads_dir)?;

        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .unwrap_or_default();

        Ok(Self {
            uploads_dir,
            client,
        })
    }

    /// Directory uploads are stored in.
    #[must_use]
    pub fn uploads_dir(&self) -> &PathBuf {
        &self.uploads_dir
    }

    /// Persist uploaded bytes and return the stored file name.
    ///
    /// File names are generated, never taken from the client.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::UnsupportedType` for non-image content types,
    /// `MediaError::Empty` for zero-length uploads, and `MediaError::Io` if
    /// the write fails.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn store(&self, content_type: &str, bytes: &[u8]) -> Result<String, MediaError> {
        let extension = ACCEPTED_TYPES
            .iter()
            .find(|(ty, _)| *ty == content_type)
            .map(|(_, ext)| *ext)
            .ok_or_else(|| MediaError::UnsupportedType(content_type.to_string()))?;

        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }

        let file_name = format!("{}.{extension}", Uuid::new_v4());
        let path = self.uploads_dir.join(&file_name);
        tokio::fs::write(&path, bytes).await?;

        Ok(file_name)
    }

    /// Verify a stored asset answers at its public URL.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::NotRetrievable` if the HEAD request fails or
    /// returns a non-success status.
    pub async fn probe(&self, public_url: &str) -> Result<(), MediaError> {
        let ok = match self.client.head(public_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, url = %public_url, "upload probe request failed");
                false
            }
        };

        if ok {
            Ok(())
        } else {
            Err(MediaError::NotRetrievable(public_url.to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> MediaStore {
        let dir = std::env::temp_dir().join(format!("nothanks-media-{}", Uuid::new_v4()));
        MediaStore::new(dir).unwrap()
    }

    #[tokio::test]
    async fn test_store_accepts_images_and_generates_names() {
        let store = temp_store();
        let name = store.store("image/png", b"not-really-a-png").await.unwrap();
        assert!(name.ends_with(".png"));
        assert!(store.uploads_dir().join(&name).exists());

        // A second upload of identical bytes gets its own file
        let other = store.store("image/png", b"not-really-a-png").await.unwrap();
        assert_ne!(name, other);
    }

    #[tokio::test]
    async fn test_store_rejects_unsupported_type() {
        let store = temp_store();
        let err = store
            .store("application/x-msdownload", b"MZ")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedType(_)));
    }

    #[tokio::test]
    async fn test_store_rejects_empty_upload() {
        let store = temp_store();
        let err = store.store("image/jpeg", b"").await.unwrap_err();
        assert!(matches!(err, MediaError::Empty));
    }

    #[tokio::test]
    async fn test_probe_fails_when_nothing_listens() {
        let store = temp_store();
        let err = store.probe("http://127.0.0.1:1/uploads/x.png").await;
        assert!(matches!(err, Err(MediaError::NotRetrievable(_))));
    }
}
