//! # Headless Mode
//!
//! One request through the same controller the TUI uses, for
//! `imagine --prompt "..."`. The caller decides how to print the result.

use std::io;
use std::sync::Arc;

use log::info;

use crate::core::action::SubmitError;
use crate::core::controller::Controller;
use crate::core::pipeline::Pipeline;
use crate::core::state::Surface;

/// What a successful one-shot run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessOutput {
    pub url: String,
    /// e.g. `1024x1024 PNG`
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeadlessError {
    #[error("{0}")]
    Rejected(#[from] SubmitError),
    /// The request failed; carries the message the view would show.
    #[error("{0}")]
    Failed(String),
    #[error("generation did not complete")]
    Incomplete,
}

impl From<HeadlessError> for io::Error {
    fn from(err: HeadlessError) -> Self {
        match err {
            HeadlessError::Rejected(_) => io::Error::new(io::ErrorKind::InvalidInput, err),
            other => io::Error::other(other),
        }
    }
}

/// Submits `prompt` and waits for the request to settle.
///
/// Must be called from within a tokio runtime.
pub async fn generate_once(
    pipeline: Arc<Pipeline>,
    prompt: impl Into<String>,
) -> Result<HeadlessOutput, HeadlessError> {
    let mut controller = Controller::new(pipeline);
    controller.edit_prompt(prompt);
    let request_id = controller.submit()?;
    info!("Headless generation {} submitted", request_id);

    match controller.settle().await.surface() {
        Surface::Image(image) => Ok(HeadlessOutput {
            url: image.url.clone(),
            summary: image.summary(),
        }),
        Surface::Error(message) => Err(HeadlessError::Failed(message.to_string())),
        Surface::Loading | Surface::Idle => Err(HeadlessError::Incomplete),
    }
}
