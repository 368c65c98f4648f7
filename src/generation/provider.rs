use async_trait::async_trait;

use super::types::GenerationResponse;

/// Faults raised by a generator instead of answering the contract.
///
/// An explicit `success: false` answer is not an error at this level; it is
/// returned as `Ok(GenerationResponse)` and classified by the pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeneratorError {
    /// Transport-level failure (DNS, refused connection, reset).
    #[error("{0}")]
    Network(String),
    /// Non-success HTTP status without a contract body.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    /// Body could not be understood.
    #[error("unexpected response: {0}")]
    Parse(String),
}

/// Longest API error body shown to the user; the full body is logged.
const MAX_API_DETAIL_CHARS: usize = 200;

impl GeneratorError {
    /// Text fit for the error banner. API bodies can be whole HTML pages,
    /// so markup is dropped and long bodies are cut.
    pub fn user_message(&self) -> String {
        match self {
            GeneratorError::Api { status, message } => {
                let detail = message.trim();
                if detail.is_empty() || detail.starts_with('<') {
                    format!("API error (HTTP {status})")
                } else if detail.chars().count() > MAX_API_DETAIL_CHARS {
                    let cut: String = detail.chars().take(MAX_API_DETAIL_CHARS).collect();
                    format!("API error (HTTP {status}): {cut}...")
                } else {
                    format!("API error (HTTP {status}): {detail}")
                }
            }
            other => other.to_string(),
        }
    }
}

/// The injected image-generation capability.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns the name of the generator.
    fn name(&self) -> &str;

    /// Generates an image for the prompt, passed through untrimmed.
    async fn generate(&self, prompt: &str) -> Result<GenerationResponse, GeneratorError>;
}
