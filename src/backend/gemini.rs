//! Gemini `generateContent` HTTP client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::backend::traits::{GenerateContentRequest, GenerateContentResponse, GenerationApi};
use crate::config::ApiConfig;
use crate::error::{AppError, Result};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP-based Gemini generation API
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

/// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GeminiBackend {
    /// Create a new backend; fails if the credential is missing
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.key.clone(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerationApi for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };
        let url = self.endpoint(model);

        let parts: usize = request.contents.iter().map(|c| c.parts.len()).sum();
        debug!(model = %model, parts, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(parsed) => {
                    if let Some(code) = parsed.error.status.as_deref() {
                        debug!(status = %code, "Generation API error status");
                    }
                    parsed.error.message
                }
                Err(_) => body,
            };
            warn!(model = %model, status = %status, message = %message, "Generation API call failed");
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = response.json::<GenerateContentResponse>().await?;
        debug!(model = %model, candidates = parsed.candidates.len(), "Received generateContent response");
        Ok(parsed)
    }
}
