//! Saving generated images to disk

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::Result;
use crate::response::base64;

/// Writes generated images into an output directory
#[derive(Debug, Clone)]
pub struct FileHandler {
    output_dir: PathBuf,
    file_prefix: String,
}

impl FileHandler {
    /// Create a new file handler
    pub fn new(output_dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Ensure the output directory exists
    pub async fn ensure_output_dir(&self) -> Result<()> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir).await?;
            debug!(path = ?self.output_dir, "Created output directory");
        }
        Ok(())
    }

    /// Name for the `index`-th (1-based) image saved at `timestamp_ms`
    pub fn file_name(&self, timestamp_ms: i64, index: usize) -> String {
        format!("{}-{}-{}.png", self.file_prefix, timestamp_ms, index)
    }

    /// Save base64 encoded image data under the given file name
    pub async fn save_base64(&self, b64_data: &str, file_name: &str) -> Result<PathBuf> {
        self.ensure_output_dir().await?;

        let image_data = base64::decode(b64_data)?;
        let file_path = self.output_dir.join(file_name);

        fs::write(&file_path, &image_data).await?;

        debug!(path = ?file_path, size = image_data.len(), "Saved image file");

        Ok(file_path)
    }

    /// Save one generated image; `index` is 1-based
    pub async fn download(&self, b64_data: &str, index: usize) -> Result<PathBuf> {
        let file_name = self.file_name(chrono::Utc::now().timestamp_millis(), index);
        self.save_base64(b64_data, &file_name).await
    }

    /// Save every image in order, numbering them from 1
    pub async fn download_all(&self, images: &[String]) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(images.len());

        for (i, image) in images.iter().enumerate() {
            paths.push(self.download(image, i + 1).await?);
        }

        Ok(paths)
    }
}
