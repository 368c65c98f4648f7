//! # Generation
//!
//! The external side of the app: the injected image-generation capability,
//! the preloader that verifies a result is loadable, and the concrete
//! HTTP-backed implementations of both.

pub mod preload;
pub mod provider;
pub mod providers;
pub mod types;

use std::sync::Arc;

use crate::Provider;
use crate::core::config::{ConfigError, ResolvedConfig};

pub use preload::{HttpPreloader, ImagePreloader, PreloadError};
pub use provider::{GeneratorError, ImageGenerator};
pub use providers::{EndpointGenerator, OpenAiGenerator};
pub use types::{GenerationFailure, GenerationOutcome, GenerationResponse, PreloadedImage};

/// Build a generator from a resolved config's provider and credentials.
pub fn build_generator(config: &ResolvedConfig) -> Result<Arc<dyn ImageGenerator>, ConfigError> {
    match config.provider {
        Provider::Endpoint => Ok(Arc::new(EndpointGenerator::new(
            config.endpoint_url.clone(),
            config.endpoint_api_key.clone(),
        ))),
        Provider::OpenAi => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or(ConfigError::MissingCredential("OPENAI_API_KEY"))?;
            Ok(Arc::new(
                OpenAiGenerator::new(api_key, Some(config.openai_base_url.clone()))
                    .with_model(config.openai_model.clone())
                    .with_size(config.openai_size.clone()),
            ))
        }
    }
}
