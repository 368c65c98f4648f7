//! # Actions
//!
//! Everything that can happen in Imagine becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! The generation task resolves? That's `Action::GenerationFinished`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing the I/O the caller must
//! perform. No side effects here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Lifecycle: Idle → Pending → (Success | Failure) → Idle.

use log::{debug, error, info, warn};

use crate::core::state::{GenerationState, RequestId};
use crate::generation::GenerationOutcome;

#[derive(Debug)]
pub enum Action {
    /// Prompt text replaced (every keystroke).
    EditPrompt(String),
    /// User asked to generate from the current prompt.
    Submit,
    /// The background task for `request_id` resolved.
    GenerationFinished {
        request_id: RequestId,
        outcome: GenerationOutcome,
    },
    Quit,
}

/// A submission the caller must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub request_id: RequestId,
    /// Raw prompt, untrimmed.
    pub prompt: String,
}

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("a generation request is already pending")]
    Busy,
    #[error("prompt is empty")]
    EmptyPrompt,
}

#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    SpawnGeneration(GenerationJob),
    Rejected(SubmitError),
    Quit,
}

pub fn update(state: &mut GenerationState, action: Action) -> Effect {
    match action {
        Action::EditPrompt(text) => {
            // Input is locked while a request is in flight
            if state.is_pending() {
                debug!("Ignoring prompt edit while pending");
            } else {
                state.prompt_text = text;
            }
            Effect::None
        }
        Action::Submit => match begin_submission(state) {
            Ok(job) => {
                info!(
                    "Submitting generation {} (prompt_len={})",
                    job.request_id,
                    job.prompt.len()
                );
                Effect::SpawnGeneration(job)
            }
            Err(reason) => {
                debug!("Submit rejected: {}", reason);
                Effect::Rejected(reason)
            }
        },
        Action::GenerationFinished {
            request_id,
            outcome,
        } => {
            if state.in_flight != Some(request_id) {
                warn!("Dropping stale completion for request {}", request_id);
                return Effect::None;
            }
            match outcome {
                Ok(image) => {
                    info!("Generation {} succeeded: {}", request_id, image.url);
                    state.status_message = format!("Image ready ({})", image.summary());
                    state.result = Some(image);
                    state.prompt_text.clear();
                }
                Err(failure) => {
                    let message = failure.message();
                    error!("Generation {} failed: {:?}", request_id, failure);
                    state.status_message = String::from("Generation failed");
                    state.error_message = Some(message);
                }
            }
            state.in_flight = None;
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

/// Guard + reset: refuses blank prompts and re-entrant submits, otherwise
/// clears the previous result/error and marks the new request pending.
fn begin_submission(state: &mut GenerationState) -> Result<GenerationJob, SubmitError> {
    if state.is_pending() {
        return Err(SubmitError::Busy);
    }
    if state.prompt_text.trim().is_empty() {
        return Err(SubmitError::EmptyPrompt);
    }

    let request_id = RequestId::new();
    state.in_flight = Some(request_id);
    state.result = None;
    state.error_message = None;
    state.status_message = String::from("Generating...");

    Ok(GenerationJob {
        request_id,
        prompt: state.prompt_text.clone(),
    })
}
