//! Image storage on the local filesystem.
//!
//! Files land in `<upload_dir>/products/<uuid><ext>` and are served by the
//! static `/uploads` route, so the public URL mirrors the relative path.

use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use bytes::Bytes;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{Error, Result};

pub const ALLOWED_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".webp", ".gif"];
pub const MAX_FILES_PER_UPLOAD: usize = 5;

const PRODUCTS_DIR: &str = "products";
const PUBLIC_PREFIX: &str = "/uploads/products/";

/// A file read from a multipart body, not yet validated or written.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl PendingUpload {
    /// Lower-cased extension including the dot, e.g. `.png`.
    fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
    }
}

pub struct UploadStore {
    root: PathBuf,
    max_size: usize,
}

impl UploadStore {
    pub fn new(root: PathBuf, max_size: usize) -> Self {
        Self { root, max_size }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.root.join(PRODUCTS_DIR)).await
    }

    /// Reject anything that is not an allowed image within the size limit.
    pub fn validate(&self, upload: &PendingUpload) -> Result<String> {
        let ext = upload
            .extension()
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| {
                Error::BadRequest(format!(
                    "file type not allowed, use one of: {}",
                    ALLOWED_EXTENSIONS.join(", ")
                ))
            })?;

        if !upload.content_type.starts_with("image/") {
            return Err(Error::BadRequest("file must be an image".to_string()));
        }

        if upload.data.len() > self.max_size {
            return Err(Error::BadRequest(format!(
                "file too large, maximum is {} bytes",
                self.max_size
            )));
        }

        Ok(ext)
    }

    /// Validate and write one file; returns its public URL.
    pub async fn save(&self, upload: &PendingUpload) -> Result<String> {
        let ext = self.validate(upload)?;
        let name = format!("{}{}", Uuid::new_v4(), ext);
        let path = self.root.join(PRODUCTS_DIR).join(&name);

        tokio::fs::write(&path, &upload.data).await?;
        info!("[Uploads] Stored {} ({} bytes)", name, upload.data.len());

        Ok(format!("{PUBLIC_PREFIX}{name}"))
    }

    /// Validate every file first so a bad file in the batch writes nothing.
    pub async fn save_all(&self, uploads: &[PendingUpload]) -> Result<Vec<String>> {
        if uploads.len() > MAX_FILES_PER_UPLOAD {
            return Err(Error::BadRequest(format!(
                "at most {MAX_FILES_PER_UPLOAD} images per upload"
            )));
        }
        for upload in uploads {
            self.validate(upload)?;
        }

        let mut urls = Vec::with_capacity(uploads.len());
        for upload in uploads {
            urls.push(self.save(upload).await?);
        }
        Ok(urls)
    }

    /// Remove the file behind a public URL. Failures are logged only.
    pub async fn delete(&self, url: &str) {
        let Some(name) = Path::new(url).file_name() else {
            return;
        };
        let path = self.root.join(PRODUCTS_DIR).join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!("[Uploads] Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("[Uploads] Failed to remove {}: {}", path.display(), e),
        }
    }
}

/// Collect every part named `field` from a multipart body.
pub async fn read_files(multipart: &mut Multipart, field: &str) -> Result<Vec<PendingUpload>> {
    let mut files = Vec::new();
    while let Some(part) = multipart.next_field().await? {
        if part.name() != Some(field) {
            continue;
        }
        let filename = part.file_name().unwrap_or_default().to_string();
        let content_type = part
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = part.bytes().await?;
        files.push(PendingUpload {
            filename,
            content_type,
            data,
        });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: &str, size: usize) -> PendingUpload {
        PendingUpload {
            filename: name.into(),
            content_type: content_type.into(),
            data: Bytes::from(vec![0u8; size]),
        }
    }

    #[test]
    fn extension_and_mime_are_checked() {
        let store = UploadStore::new(PathBuf::from("unused"), 1024);
        assert_eq!(store.validate(&upload("foto.PNG", "image/png", 10)).unwrap(), ".png");
        assert!(store.validate(&upload("doc.pdf", "image/png", 10)).is_err());
        assert!(store.validate(&upload("noext", "image/png", 10)).is_err());
        assert!(store.validate(&upload("foto.jpg", "text/plain", 10)).is_err());
        assert!(store.validate(&upload("foto.jpg", "image/jpeg", 1025)).is_err());
    }

    #[tokio::test]
    async fn save_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().to_path_buf(), 1024);
        store.ensure_dirs().await.unwrap();

        let url = store.save(&upload("a.webp", "image/webp", 8)).await.unwrap();
        assert!(url.starts_with("/uploads/products/") && url.ends_with(".webp"));
        let name = url.trim_start_matches("/uploads/products/");
        let path = dir.path().join("products").join(name);
        assert!(path.exists());

        store.delete(&url).await;
        assert!(!path.exists());
        // second delete is a no-op
        store.delete(&url).await;
    }

    #[tokio::test]
    async fn one_bad_file_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().to_path_buf(), 1024);
        store.ensure_dirs().await.unwrap();

        let batch = [upload("a.png", "image/png", 4), upload("b.exe", "image/png", 4)];
        assert!(store.save_all(&batch).await.is_err());
        let written = std::fs::read_dir(dir.path().join("products")).unwrap().count();
        assert_eq!(written, 0);

        let too_many = vec![upload("a.png", "image/png", 4); 6];
        assert!(store.save_all(&too_many).await.is_err());
    }
}
