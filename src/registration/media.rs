//! Photo and signature storage
//!
//! Uploads are not part of number allocation. A failed upload is reported to
//! the caller, which falls back to the configured placeholder image.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::models::MediaKind;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Empty upload for {0}")]
    Empty(&'static str),

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Upload too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Blob storage for registration media
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store the file and return its public URL
    async fn upload(
        &self,
        kind: MediaKind,
        key: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError>;
}

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Lowercased extension if it is an accepted image type
fn image_extension(file_name: &str) -> Result<String, MediaError> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
        .ok_or_else(|| MediaError::UnsupportedType(file_name.to_string()))
}

/// Stores files on local disk under `root`, served from `base_url`
pub struct LocalMediaStore {
    root: PathBuf,
    base_url: String,
    max_bytes: usize,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload(
        &self,
        kind: MediaKind,
        key: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::Empty(kind.as_str()));
        }
        if bytes.len() > self.max_bytes {
            return Err(MediaError::TooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }
        let ext = image_extension(file_name)?;

        // key is caller-generated; keep only characters safe in a file name
        let key: String = key
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        let stored_name = format!("{}_{}.{}", key, kind.as_str(), ext);

        let dir = self.root.join(kind.as_str());
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&stored_name), bytes).await?;

        tracing::debug!(kind = kind.as_str(), file = %stored_name, size = bytes.len(), "Media stored");
        Ok(format!("{}/{}/{}", self.base_url, kind.as_str(), stored_name))
    }
}
