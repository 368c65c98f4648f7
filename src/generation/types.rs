use std::fmt;

use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

/// Shown when a failure carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate image";
/// Shown when the capability reports success but sends no image location.
pub const MISSING_IMAGE_MESSAGE: &str = "No image URL received";
/// Prefix for failures of the verify-loadable stage.
pub const PRELOAD_FAILURE_PREFIX: &str = "Generated image could not be loaded";

/// The capability's answer to a prompt.
///
/// Mirrors the JSON contract `{success, imageUrl?, error?}` so that HTTP
/// endpoints speaking it can be deserialized directly.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResponse {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            success: true,
            image_url: Some(url.into()),
            error: None,
        }
    }

    pub fn failure(error: Option<String>) -> Self {
        Self {
            success: false,
            image_url: None,
            error,
        }
    }

    /// Classifies the response: the image location on success, otherwise
    /// the matching failure. An empty location counts as missing.
    pub fn into_image_url(self) -> Result<String, GenerationFailure> {
        if !self.success {
            return Err(GenerationFailure::Explicit(self.error));
        }
        match self.image_url {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(GenerationFailure::MissingResult),
        }
    }
}

/// Every way a submission can end without an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    /// Capability answered `success: false`, optionally with a message.
    Explicit(Option<String>),
    /// Capability answered `success: true` without an image location.
    MissingResult,
    /// Capability raised (transport error, panic, timeout).
    Fault(Option<String>),
    /// Image location could not be fetched or decoded.
    Preload(String),
}

impl GenerationFailure {
    /// The single string surfaced to the user.
    pub fn message(&self) -> String {
        match self {
            GenerationFailure::Explicit(msg) | GenerationFailure::Fault(msg) => msg
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(GENERIC_FAILURE_MESSAGE)
                .to_string(),
            GenerationFailure::MissingResult => MISSING_IMAGE_MESSAGE.to_string(),
            GenerationFailure::Preload(cause) => format!("{PRELOAD_FAILURE_PREFIX}: {cause}"),
        }
    }
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// An image that has been fetched and decoded, ready to display.
#[derive(Clone, PartialEq)]
pub struct PreloadedImage {
    pub url: String,
    pub format: Option<ImageFormat>,
    pub width: u32,
    pub height: u32,
    /// Downscaled RGB copy used by the terminal preview.
    pub preview: RgbImage,
}

impl PreloadedImage {
    /// Short description such as `1024x1024 PNG`.
    pub fn summary(&self) -> String {
        match self.format {
            Some(format) => format!(
                "{}x{} {}",
                self.width,
                self.height,
                format!("{format:?}").to_uppercase()
            ),
            None => format!("{}x{}", self.width, self.height),
        }
    }
}

// Preview pixels are noise in logs.
impl fmt::Debug for PreloadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreloadedImage")
            .field("url", &self.url)
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("preview", &self.preview.dimensions())
            .finish()
    }
}

/// Result of one pass through the generation pipeline.
pub type GenerationOutcome = Result<PreloadedImage, GenerationFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parses_contract_json() {
        let ok: GenerationResponse =
            serde_json::from_str(r#"{"success":true,"imageUrl":"https://img/x.png"}"#).unwrap();
        assert_eq!(ok, GenerationResponse::image("https://img/x.png"));

        let failed: GenerationResponse =
            serde_json::from_str(r#"{"success":false,"error":"bad prompt"}"#).unwrap();
        assert_eq!(failed, GenerationResponse::failure(Some("bad prompt".into())));
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let json = serde_json::to_string(&GenerationResponse::image("X")).unwrap();
        assert_eq!(json, r#"{"success":true,"imageUrl":"X"}"#);
    }

    #[test]
    fn test_into_image_url_classifies() {
        assert_eq!(GenerationResponse::image("X").into_image_url(), Ok("X".to_string()));
        assert_eq!(
            GenerationResponse::failure(None).into_image_url(),
            Err(GenerationFailure::Explicit(None))
        );

        let no_url = GenerationResponse {
            success: true,
            ..Default::default()
        };
        assert_eq!(no_url.into_image_url(), Err(GenerationFailure::MissingResult));

        let blank_url = GenerationResponse::image("  ");
        assert_eq!(blank_url.into_image_url(), Err(GenerationFailure::MissingResult));
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            GenerationFailure::Explicit(Some("bad prompt".into())).message(),
            "bad prompt"
        );
        assert_eq!(GenerationFailure::Explicit(None).message(), "Failed to generate image");
        assert_eq!(
            GenerationFailure::Explicit(Some(String::new())).message(),
            "Failed to generate image"
        );
        assert_eq!(GenerationFailure::MissingResult.message(), "No image URL received");
        assert_eq!(
            GenerationFailure::Fault(Some("network down".into())).message(),
            "network down"
        );
        assert_eq!(GenerationFailure::Fault(None).message(), "Failed to generate image");
        assert_eq!(
            GenerationFailure::Preload("HTTP 404".into()).to_string(),
            "Generated image could not be loaded: HTTP 404"
        );
    }

    #[test]
    fn test_summary_includes_format() {
        let image = PreloadedImage {
            url: "X".into(),
            format: Some(ImageFormat::Png),
            width: 1024,
            height: 768,
            preview: RgbImage::new(1, 1),
        };
        assert_eq!(image.summary(), "1024x768 PNG");

        let unknown = PreloadedImage { format: None, ..image };
        assert_eq!(unknown.summary(), "1024x768");
    }
}
