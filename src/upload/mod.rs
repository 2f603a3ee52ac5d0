//! Reference image uploads: reading, media-type sniffing and the bounded upload list

use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::response::base64;

/// Maximum number of reference images held at once
pub const MAX_UPLOADS: usize = 5;

/// Media types accepted for reference images
pub const ACCEPTED_MEDIA_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/webp"];

/// A reference image ready to be sent inline to the generation API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Base64 payload without any data URL prefix
    pub encoded_data: String,
    pub media_type: String,
    pub file_name: String,
}

impl UploadedImage {
    pub fn new(
        encoded_data: impl Into<String>,
        media_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            encoded_data: base64::strip_data_url_prefix(&encoded_data.into()).to_string(),
            media_type: media_type.into(),
            file_name: file_name.into(),
        }
    }

    /// Approximate size of the decoded image in bytes
    pub fn byte_len(&self) -> usize {
        base64::decoded_len(&self.encoded_data)
    }
}

/// Ordered list of uploads that never grows past [`MAX_UPLOADS`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadList {
    images: Vec<UploadedImage>,
}

impl UploadList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn available_slots(&self) -> usize {
        MAX_UPLOADS.saturating_sub(self.images.len())
    }

    pub fn images(&self) -> &[UploadedImage] {
        &self.images
    }

    /// Append images in order, keeping only as many as fit.
    ///
    /// Returns the number of images appended.
    pub fn extend<I>(&mut self, images: I) -> usize
    where
        I: IntoIterator<Item = UploadedImage>,
    {
        let before = self.images.len();
        let slots = self.available_slots();
        self.images.extend(images.into_iter().take(slots));
        self.images.len() - before
    }

    /// Remove the image at `index`, keeping the order of the rest
    pub fn remove(&mut self, index: usize) -> Option<UploadedImage> {
        if index < self.images.len() {
            Some(self.images.remove(index))
        } else {
            None
        }
    }
}

/// Read one file and encode it as an [`UploadedImage`]
pub async fn encode_file(path: &Path) -> Result<UploadedImage> {
    let data = fs::read(path)
        .await
        .map_err(|e| AppError::FileRead(format!("{}: {}", path.display(), e)))?;

    let media_type = detect_media_type(&data)
        .or_else(|| media_type_from_extension(path))
        .ok_or_else(|| {
            AppError::FileRead(format!("{}: unsupported image type", path.display()))
        })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    debug!(file = %file_name, media_type = %media_type, size = data.len(), "Encoded upload");

    Ok(UploadedImage {
        encoded_data: base64::encode(&data),
        media_type: media_type.to_string(),
        file_name,
    })
}

/// Encode a batch of files concurrently; one failure rejects the whole batch
pub async fn encode_files(paths: &[PathBuf]) -> Result<Vec<UploadedImage>> {
    let images = try_join_all(paths.iter().map(|path| encode_file(path)))
        .await
        .map_err(|e| {
            warn!(error = ?e, "Failed to read upload batch");
            e
        })?;
    Ok(images)
}

/// Detect an accepted image media type from magic bytes
pub fn detect_media_type(data: &[u8]) -> Option<&'static str> {
    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    None
}

fn media_type_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
