//! On-disk store for uploaded project images.
//!
//! Uploads arrive base64-encoded in JSON bodies. Files are written under
//! `<root>/<folder>/<random name>.<ext>` and referenced by that relative path.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use utoipa::ToSchema;

const NAME_LEN: usize = 40;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image data is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("image is {size} bytes, the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("file is not a supported image (png, jpeg, gif, webp, bmp, svg)")]
    UnsupportedType,

    #[error("image storage failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Image as sent by a client.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImageUpload {
    /// Base64 (standard alphabet) file contents. A `data:` URL prefix is accepted.
    pub data: String,
    /// Original file name, informational only.
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
    Svg,
}

impl ImageKind {
    /// Detects the format from leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Some(ImageKind::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageKind::Jpeg);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(ImageKind::Gif);
        }
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(ImageKind::Webp);
        }
        if bytes.starts_with(b"BM") {
            return Some(ImageKind::Bmp);
        }
        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]).to_lowercase();
        let head = head.trim_start();
        if (head.starts_with("<svg") || head.starts_with("<?xml")) && head.contains("<svg") {
            return Some(ImageKind::Svg);
        }
        None
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
            ImageKind::Bmp => "bmp",
            ImageKind::Svg => "svg",
        }
    }
}

pub struct ImageStore {
    root: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// Decodes and checks an upload without touching the disk.
    pub fn decode(&self, upload: &ImageUpload) -> Result<(Vec<u8>, ImageKind), ImageError> {
        let data = upload.data.trim();
        let data = match data.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => data,
        };
        // Cheap pre-check before allocating the decoded buffer.
        if data.len() / 4 * 3 > self.max_bytes.saturating_add(3) {
            return Err(ImageError::TooLarge {
                size: data.len() / 4 * 3,
                max: self.max_bytes,
            });
        }
        let bytes = STANDARD.decode(data)?;
        if bytes.len() > self.max_bytes {
            return Err(ImageError::TooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }
        let kind = ImageKind::sniff(&bytes).ok_or(ImageError::UnsupportedType)?;
        Ok((bytes, kind))
    }

    /// Stores an upload under `folder` and returns its relative path.
    pub async fn save(&self, folder: &str, upload: &ImageUpload) -> Result<String, ImageError> {
        let (bytes, kind) = self.decode(upload)?;
        let relative = format!("{}/{}.{}", folder, random_name(), kind.extension());
        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        debug!(path = %relative, bytes = bytes.len(), "stored image");
        Ok(relative)
    }

    /// Removes a stored image. Paths this store did not produce (external URLs,
    /// absolute or parent-relative paths) and already-missing files are ignored.
    pub async fn delete(&self, relative: &str) -> Result<(), ImageError> {
        let Some(path) = self.resolve(relative) else {
            debug!(path = relative, "not a managed image, skipping delete");
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = relative, "deleted image");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = relative, "image already missing");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort delete used after a record change already committed.
    pub async fn discard(&self, relative: &str) {
        if let Err(e) = self.delete(relative).await {
            warn!(path = relative, error = %e, "failed to delete image");
        }
    }

    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        if relative.contains("://") {
            return None;
        }
        let candidate = Path::new(relative);
        let managed = !relative.is_empty()
            && candidate
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        managed.then(|| self.root.join(candidate))
    }
}

fn random_name() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NAME_LEN)
        .map(char::from)
        .collect()
}
