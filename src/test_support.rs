//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};

use crate::generation::{
    GenerationResponse, GeneratorError, ImageGenerator, ImagePreloader, PreloadError,
    PreloadedImage,
};

/// A generator that answers every prompt the same way and records prompts.
pub struct StaticGenerator {
    answer: Result<GenerationResponse, GeneratorError>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl StaticGenerator {
    pub fn response(response: GenerationResponse) -> Self {
        Self {
            answer: Ok(response),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn image(url: &str) -> Self {
        Self::response(GenerationResponse::image(url))
    }

    pub fn failure(error: Option<&str>) -> Self {
        Self::response(GenerationResponse::failure(error.map(str::to_string)))
    }

    pub fn error(error: GeneratorError) -> Self {
        Self {
            answer: Err(error),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for StaticGenerator {
    fn name(&self) -> &str {
        "static"
    }

    async fn generate(&self, prompt: &str) -> Result<GenerationResponse, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer.clone()
    }
}

/// A generator that never resolves.
pub struct HangingGenerator;

#[async_trait]
impl ImageGenerator for HangingGenerator {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn generate(&self, _prompt: &str) -> Result<GenerationResponse, GeneratorError> {
        std::future::pending().await
    }
}

/// A generator that panics when polled.
pub struct PanickingGenerator;

#[async_trait]
impl ImageGenerator for PanickingGenerator {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn generate(&self, _prompt: &str) -> Result<GenerationResponse, GeneratorError> {
        panic!("generator exploded")
    }
}

/// A preloader that accepts any location without I/O.
pub struct StaticPreloader;

#[async_trait]
impl ImagePreloader for StaticPreloader {
    async fn preload(&self, url: &str) -> Result<PreloadedImage, PreloadError> {
        Ok(sample_image(url))
    }
}

/// A preloader whose fetch never completes.
pub struct HangingPreloader;

#[async_trait]
impl ImagePreloader for HangingPreloader {
    async fn preload(&self, _url: &str) -> Result<PreloadedImage, PreloadError> {
        std::future::pending().await
    }
}

/// A preloader that always fails with the given error.
pub struct FailingPreloader(pub PreloadError);

#[async_trait]
impl ImagePreloader for FailingPreloader {
    async fn preload(&self, _url: &str) -> Result<PreloadedImage, PreloadError> {
        Err(self.0.clone())
    }
}

/// A small decoded image for `url` with a two-color preview.
pub fn sample_image(url: &str) -> PreloadedImage {
    let preview = RgbImage::from_fn(4, 4, |_, y| {
        if y < 2 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) }
    });
    PreloadedImage {
        url: url.to_string(),
        format: Some(ImageFormat::Png),
        width: 1024,
        height: 1024,
        preview,
    }
}

/// Encodes a solid-color PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([40, 120, 200]));
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png).unwrap();
    cursor.into_inner()
}
