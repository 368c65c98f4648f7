//! OpenAI Images API generator.
//!
//! Requests `response_format: "url"` so the answer maps onto the generation
//! contract without writing image bytes anywhere. Only the `dall-e-*` models
//! accept that parameter; other models (`gpt-image-*`) always answer with
//! base64 data, get no `response_format`, and end as "No image URL received".
//!
//! - `data[0].url` present → success with that location
//! - `data` empty or without a url → success without location
//! - error body (`{"error": {"message": ...}}`) → explicit failure

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::generation::{GenerationResponse, GeneratorError, ImageGenerator};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "dall-e-3";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

#[derive(Serialize, Debug)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'static str>,
}

/// Whether `model` can answer with hosted image URLs.
fn supports_url_response(model: &str) -> bool {
    model.starts_with("dall-e")
}

#[derive(Deserialize, Debug)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize, Debug)]
struct ImageData {
    url: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ErrorDetail {
    message: String,
}

pub struct OpenAiGenerator {
    api_key: String,
    base_url: String,
    model: String,
    size: String,
    client: reqwest::Client,
}

impl OpenAiGenerator {
    /// Creates a new OpenAI generator.
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key
    /// * `base_url` - Optional custom base URL (defaults to OpenAI's API)
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            size: DEFAULT_IMAGE_SIZE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }
}

#[async_trait]
impl ImageGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<GenerationResponse, GeneratorError> {
        let request = ImagesRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
            response_format: supports_url_response(&self.model).then_some("url"),
        };
        info!(
            "OpenAI images request: model={}, size={}, prompt_len={}",
            self.model,
            self.size,
            prompt.len()
        );

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GeneratorError::Network(e.to_string()))?;

        let status = response.status();
        debug!("OpenAI response status: {}", status);
        let body = response
            .text()
            .await
            .map_err(|e| GeneratorError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!("OpenAI API error: {} - {}", status.as_u16(), body);
            return match serde_json::from_str::<ErrorBody>(&body) {
                Ok(parsed) => Ok(GenerationResponse::failure(Some(parsed.error.message))),
                Err(_) => Err(GeneratorError::Api {
                    status: status.as_u16(),
                    message: body,
                }),
            };
        }

        let parsed: ImagesResponse =
            serde_json::from_str(&body).map_err(|e| GeneratorError::Parse(e.to_string()))?;

        Ok(GenerationResponse {
            success: true,
            image_url: parsed.data.into_iter().find_map(|d| d.url),
            error: None,
        })
    }
}
