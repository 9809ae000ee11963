//! Blob storage for uploaded inputs and generated outputs
//!
//! Keys are `/`-separated relative paths. [`LocalBlobStore`] maps them onto a
//! root directory and refuses anything that would resolve outside it.

use crate::error::StoreError;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Content type used for uploads when nothing better is known
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const CONTENT_TYPE_SUFFIX: &str = ".content-type";

/// Key/value store for raw artifact bytes
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Content type recorded at upload, if any
    async fn content_type(&self, key: &str) -> Result<Option<String>, StoreError>;
}

/// Filesystem-backed store rooted at a directory
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path under the root
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.trim().is_empty() {
            return Err(StoreError::InvalidKey("empty key".to_string()));
        }
        if key.contains('\\') || key.contains('\0') {
            return Err(StoreError::InvalidKey(key.to_string()));
        }

        let relative = Path::new(key);
        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                _ => return Err(StoreError::InvalidKey(key.to_string())),
            }
        }

        if path == self.root {
            return Err(StoreError::InvalidKey(key.to_string()));
        }

        Ok(path)
    }

    fn sidecar(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(CONTENT_TYPE_SUFFIX);
        PathBuf::from(name)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, bytes).await?;
        tokio::fs::write(Self::sidecar(&path), content_type).await?;

        tracing::debug!(
            "[LocalBlobStore] Stored {} ({} bytes, {})",
            key,
            bytes.len(),
            content_type
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn content_type(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(Self::sidecar(&path)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Last path segment of an uploaded file name
fn file_segment(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

/// `inputs/<user>/<filename>`
pub fn input_key(user_id: &str, filename: &str) -> String {
    format!("inputs/{}/{}", user_id, file_segment(filename))
}

/// `outputs/<user>/<title>-<filename>.<ext>`
pub fn output_key(user_id: &str, title: &str, filename: &str, extension: &str) -> String {
    format!(
        "outputs/{}/{}-{}.{}",
        user_id,
        title,
        file_segment(filename),
        extension
    )
}

/// Download content type: PDFs are served as such, everything else as text
pub fn content_type_for_key(key: &str) -> &'static str {
    if key.ends_with(".pdf") {
        "application/pdf"
    } else {
        "text/plain"
    }
}

/// Content type recorded for an uploaded file, guessed from its name
pub fn upload_content_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

/// File name part of a key, used as the download name
pub fn key_file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
