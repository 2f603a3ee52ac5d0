//! Generation client: fans one request out into parallel API calls and collects the images

pub mod prompt;

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::backend::traits::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationApi, GenerationConfig,
    Part, ResponseModality,
};
use crate::error::{AppError, Result};
use crate::upload::UploadedImage;

pub use prompt::build_prompt;

/// Number of variants produced per generation
pub const VARIANT_COUNT: usize = 4;

/// Everything needed for one generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub images: Vec<UploadedImage>,
    pub character_description: String,
    pub background_setting: String,
    pub remove_background: bool,
}

impl GenerationRequest {
    pub fn new(
        images: Vec<UploadedImage>,
        character_description: impl Into<String>,
        background_setting: impl Into<String>,
        remove_background: bool,
    ) -> Self {
        Self {
            images,
            character_description: character_description.into(),
            background_setting: background_setting.into(),
            remove_background,
        }
    }

    pub fn prompt(&self) -> String {
        build_prompt(
            &self.character_description,
            &self.background_setting,
            self.remove_background,
        )
    }

    /// Build the API payload: every image inline, in order, then the prompt
    pub fn to_api_request(&self, model: &str) -> GenerateContentRequest {
        let mut parts: Vec<Part> = self
            .images
            .iter()
            .map(|image| Part::inline(image.media_type.clone(), image.encoded_data.clone()))
            .collect();
        parts.push(Part::text(self.prompt()));

        GenerateContentRequest {
            model: model.to_string(),
            contents: vec![Content { role: None, parts }],
            generation_config: GenerationConfig {
                response_modalities: vec![ResponseModality::Image, ResponseModality::Text],
            },
        }
    }
}

/// Exactly [`VARIANT_COUNT`] base64 images, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    images: Vec<String>,
}

impl GenerationResult {
    pub(crate) fn new(images: Vec<String>) -> Result<Self> {
        if images.len() != VARIANT_COUNT || images.iter().any(|image| image.is_empty()) {
            return Err(AppError::Internal(format!(
                "expected {} generated images, got {}",
                VARIANT_COUNT,
                images.len()
            )));
        }
        Ok(Self { images })
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Client issuing parallel generation calls against a [`GenerationApi`]
#[derive(Clone)]
pub struct GenerationClient {
    api: Arc<dyn GenerationApi>,
}

impl GenerationClient {
    pub fn new(api: Arc<dyn GenerationApi>) -> Self {
        Self { api }
    }

    pub fn api_name(&self) -> &str {
        self.api.name()
    }

    /// Generate [`VARIANT_COUNT`] images; any single failure fails the whole call
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        self.generate_inner(request).await.map_err(|e| {
            warn!(api = %self.api.name(), error = %e, "Error generating images");
            e.into_generation_error()
        })
    }

    async fn generate_inner(&self, request: GenerationRequest) -> Result<GenerationResult> {
        if request.images.is_empty() {
            return Err(AppError::InvalidRequest(
                "At least one image must be provided.".to_string(),
            ));
        }

        let api_request = request.to_api_request(self.api.model());

        info!(
            api = %self.api.name(),
            model = %api_request.model,
            images = request.images.len(),
            remove_background = request.remove_background,
            "Generating {} image variants",
            VARIANT_COUNT
        );

        // All calls settle before any result is inspected.
        let responses = join_all(
            (0..VARIANT_COUNT).map(|_| self.api.generate_content(&api_request)),
        )
        .await;

        let mut images = Vec::with_capacity(VARIANT_COUNT);
        for (index, response) in responses.into_iter().enumerate() {
            let response = response?;
            images.push(extract_image(index, &response)?);
        }

        debug!(count = images.len(), "Collected generated images");
        GenerationResult::new(images)
    }
}

fn extract_image(index: usize, response: &GenerateContentResponse) -> Result<String> {
    match response.first_inline_image() {
        Some(inline) => Ok(inline.data.clone()),
        None => {
            warn!(
                call = index,
                block_reason = response.block_reason().unwrap_or("none"),
                "Generation response contained no image"
            );
            Err(AppError::EmptyImage)
        }
    }
}
