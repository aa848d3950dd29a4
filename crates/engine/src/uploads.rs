//! Local-disk store for review images, served back under `/uploads`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use omnilink_common::error::AppError;

/// Images accepted per review.
pub const MAX_IMAGES: usize = 6;

/// Bytes accepted per image.
pub const MAX_IMAGE_BYTES: usize = 6 * 1024 * 1024;

pub const PUBLIC_PREFIX: &str = "/uploads";

/// An image read from a form but not yet written to disk.
#[derive(Debug, Clone)]
pub struct PendingImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Reject anything that is not an image or exceeds `MAX_IMAGE_BYTES`.
pub fn check_image(original_name: &str, content_type: Option<&str>, len: usize) -> Result<(), AppError> {
    if !content_type.is_some_and(|ct| ct.starts_with("image/")) {
        return Err(AppError::Validation(format!(
            "'{}' is not an image",
            original_name
        )));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(AppError::Validation(format!(
            "'{}' exceeds the {} MiB image limit",
            original_name,
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::info!(dir = %dir.display(), "Upload store ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist one image and return its public URL path.
    pub async fn save_image(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, AppError> {
        check_image(original_name, content_type, bytes.len())?;

        let file_name = stored_file_name(original_name);
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("writing {}: {}", path.display(), e)))?;

        tracing::debug!(file = %file_name, size = bytes.len(), "Image stored");
        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }

    /// Check every image, then write them all. Nothing is left on disk when
    /// any of them fails.
    pub async fn save_images(&self, images: &[PendingImage]) -> Result<Vec<String>, AppError> {
        if images.len() > MAX_IMAGES {
            return Err(too_many_images());
        }
        for image in images {
            check_image(&image.file_name, image.content_type.as_deref(), image.bytes.len())?;
        }

        let mut saved = Vec::with_capacity(images.len());
        for image in images {
            match self
                .save_image(&image.file_name, image.content_type.as_deref(), &image.bytes)
                .await
            {
                Ok(url) => saved.push(url),
                Err(e) => {
                    self.discard(&saved).await;
                    return Err(e);
                }
            }
        }
        Ok(saved)
    }

    /// Delete previously stored images by their public URL. Best effort.
    pub async fn discard(&self, urls: &[String]) {
        for url in urls {
            let Some(name) = url
                .strip_prefix(PUBLIC_PREFIX)
                .and_then(|rest| rest.strip_prefix('/'))
                .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
            else {
                tracing::warn!(url = %url, "Refusing to discard a path outside the upload store");
                continue;
            };
            match tokio::fs::remove_file(self.dir.join(name)).await {
                Ok(()) => tracing::debug!(file = %name, "Image discarded"),
                Err(e) => tracing::warn!(file = %name, error = %e, "Failed to discard image"),
            }
        }
    }
}

pub fn too_many_images() -> AppError {
    AppError::Validation(format!("At most {} images per review", MAX_IMAGES))
}

/// `<millis>-<6 hex>-<sanitised name>`; never contains a path separator.
fn stored_file_name(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let mut safe: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .take(80)
        .collect();
    safe = safe.trim_start_matches('.').to_string();
    if safe.is_empty() {
        safe = "image".to_string();
    }

    let nonce = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", Utc::now().timestamp_millis(), &nonce[..6], safe)
}
