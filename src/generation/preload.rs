//! Verify-loadable stage: an image location is only committed once its bytes
//! have been fetched and decoded.

use async_trait::async_trait;
use log::{debug, info, warn};

use super::types::PreloadedImage;

/// Upper bound on a downloaded image body.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 32 * 1024 * 1024;
/// Longest side of the stored preview thumbnail.
pub const PREVIEW_MAX_DIMENSION: u32 = 128;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreloadError {
    #[error("unsupported image location: {0}")]
    UnsupportedLocation(String),
    #[error("{0}")]
    Network(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("image exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("not a decodable image: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ImagePreloader: Send + Sync {
    /// Fetches and decodes the image at `url`.
    async fn preload(&self, url: &str) -> Result<PreloadedImage, PreloadError>;
}

/// Preloads `http`/`https` image locations with reqwest.
pub struct HttpPreloader {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpPreloader {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            max_bytes,
        }
    }
}

impl Default for HttpPreloader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGE_BYTES)
    }
}

#[async_trait]
impl ImagePreloader for HttpPreloader {
    async fn preload(&self, url: &str) -> Result<PreloadedImage, PreloadError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|_| PreloadError::UnsupportedLocation(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PreloadError::UnsupportedLocation(url.to_string()));
        }

        info!("Preloading image: {}", url);
        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| PreloadError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!("Image preload failed: {} returned {}", url, status);
            return Err(PreloadError::Status(status));
        }

        if let Some(len) = response.content_length()
            && len > self.max_bytes as u64
        {
            return Err(PreloadError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PreloadError::Network(e.to_string()))?
        {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(PreloadError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }
        debug!("Fetched {} image bytes from {}", bytes.len(), url);

        // Decoding is CPU-bound
        let owned_url = url.to_string();
        tokio::task::spawn_blocking(move || decode_image(&owned_url, &bytes))
            .await
            .map_err(|e| PreloadError::Decode(e.to_string()))?
    }
}

/// Decodes `bytes` fully and builds the preview thumbnail.
pub fn decode_image(url: &str, bytes: &[u8]) -> Result<PreloadedImage, PreloadError> {
    let format = image::guess_format(bytes).ok();
    let decoded =
        image::load_from_memory(bytes).map_err(|e| PreloadError::Decode(e.to_string()))?;
    let preview = decoded
        .thumbnail(PREVIEW_MAX_DIMENSION, PREVIEW_MAX_DIMENSION)
        .to_rgb8();

    Ok(PreloadedImage {
        url: url.to_string(),
        format,
        width: decoded.width(),
        height: decoded.height(),
        preview,
    })
}
