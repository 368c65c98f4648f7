//! Generator backed by an HTTP endpoint that speaks the generation contract
//! directly: `POST {"prompt": "..."}` answered by
//! `{"success": bool, "imageUrl"?: string, "error"?: string}`.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;

use crate::generation::{GenerationResponse, GeneratorError, ImageGenerator};

pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:3000/api/generate";

#[derive(Serialize, Debug)]
struct EndpointRequest<'a> {
    prompt: &'a str,
}

pub struct EndpointGenerator {
    url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl EndpointGenerator {
    /// Creates a generator posting to `url`, with an optional bearer token.
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            url,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ImageGenerator for EndpointGenerator {
    fn name(&self) -> &str {
        "endpoint"
    }

    async fn generate(&self, prompt: &str) -> Result<GenerationResponse, GeneratorError> {
        info!(
            "Endpoint generation request: url={}, prompt_len={}",
            self.url,
            prompt.len()
        );

        let mut builder = self.client.post(&self.url).json(&EndpointRequest { prompt });
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GeneratorError::Network(e.to_string()))?;
        let status = response.status();
        debug!("Endpoint response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| GeneratorError::Network(e.to_string()))?;

        match serde_json::from_str::<GenerationResponse>(&body) {
            Ok(parsed) if status.is_success() => Ok(parsed),
            // A failure body on an error status is still a contract answer
            Ok(parsed) if !parsed.success => {
                warn!("Endpoint reported failure with HTTP {}", status.as_u16());
                Ok(parsed)
            }
            Ok(_) => Err(GeneratorError::Api {
                status: status.as_u16(),
                message: body,
            }),
            Err(e) if status.is_success() => Err(GeneratorError::Parse(e.to_string())),
            Err(_) => {
                warn!("Endpoint API error: {} - {}", status.as_u16(), body);
                Err(GeneratorError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}
