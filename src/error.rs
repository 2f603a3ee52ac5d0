//! Common error types for the image creator

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("{0}")]
    MissingCredential(String),

    #[error("{}", upload_limit_message(.max, .accepted))]
    UploadLimit { max: usize, accepted: usize },

    /// Detail is kept for logging; the user only sees the generic message.
    #[error("Failed to read one or more image files.")]
    FileRead(String),

    #[error("Please upload at least one image first.")]
    NoUploads,

    #[error("Generation API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("One of the generated images was empty. The model may have refused the prompt.")]
    EmptyImage,

    /// Message already normalized for display.
    #[error("{0}")]
    Generation(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn upload_limit_message(max: &usize, accepted: &usize) -> String {
    if *accepted == 0 {
        format!("You cannot upload more than {} images.", max)
    } else {
        format!(
            "You can only upload {} images in total. The first {} file(s) were added.",
            max, accepted
        )
    }
}

impl AppError {
    /// Normalize a failure caught at the generation boundary.
    pub fn into_generation_error(self) -> AppError {
        match self {
            AppError::Generation(_) => self,
            AppError::Internal(detail) => {
                tracing::debug!(detail = %detail, "Normalizing internal generation failure");
                AppError::Generation(
                    "An unknown error occurred while generating the images.".to_string(),
                )
            }
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::Json(_)
            | AppError::HttpClient(_)
            | AppError::MissingCredential(_)
            | AppError::UploadLimit { .. }
            | AppError::FileRead(_)
            | AppError::NoUploads
            | AppError::Api { .. }
            | AppError::EmptyImage
            | AppError::InvalidRequest(_) => {
                AppError::Generation(format!("Failed to generate images: {}", self))
            }
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
