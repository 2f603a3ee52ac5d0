//! Image Creator
//!
//! Turns up to five reference images and a short description into four new
//! character variants using the Gemini image generation API, then saves the
//! results to disk.

pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod response;
pub mod upload;
pub mod view;

pub use app::{Controller, Phase, Quality};
pub use error::{AppError, Result};
pub use generation::{GenerationClient, GenerationRequest, GenerationResult};
pub use upload::UploadedImage;
