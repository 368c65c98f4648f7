//! # Request Lifecycle Controller
//!
//! Owns the `GenerationState`, feeds actions through `update()`, and performs
//! the effects it returns: spawning the pipeline for a submission and folding
//! completions back in.
//!
//! Every spawned task gets a child of the controller's `CancellationToken`.
//! `shutdown()` (also run on drop) cancels them all, so no continuation
//! outlives the view that started it.

use std::sync::Arc;

use log::{debug, info};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_util::sync::CancellationToken;

use crate::core::action::{Action, Effect, SubmitError, update};
use crate::core::pipeline::Pipeline;
use crate::core::state::{GenerationState, RequestId};

pub struct Controller {
    state: GenerationState,
    pipeline: Arc<Pipeline>,
    cancel: CancellationToken,
    tx: UnboundedSender<Action>,
    rx: UnboundedReceiver<Action>,
}

impl Controller {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            state: GenerationState::new(pipeline.generator_name()),
            pipeline,
            cancel: CancellationToken::new(),
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    /// Applies `action` and performs the resulting effect.
    ///
    /// Must be called from within a tokio runtime; a submission spawns a task.
    pub fn dispatch(&mut self, action: Action) -> Effect {
        let effect = update(&mut self.state, action);
        if let Effect::SpawnGeneration(job) = &effect {
            if self.cancel.is_cancelled() {
                debug!("Controller shut down, not spawning {}", job.request_id);
            } else {
                self.pipeline
                    .spawn(job.clone(), self.cancel.child_token(), self.tx.clone());
            }
        }
        effect
    }

    pub fn edit_prompt(&mut self, text: impl Into<String>) {
        self.dispatch(Action::EditPrompt(text.into()));
    }

    /// Submits the current prompt. Refused while pending or when blank.
    pub fn submit(&mut self) -> Result<RequestId, SubmitError> {
        match self.dispatch(Action::Submit) {
            Effect::SpawnGeneration(job) => Ok(job.request_id),
            Effect::Rejected(reason) => Err(reason),
            other => unreachable!("Submit produced {other:?}"),
        }
    }

    /// Applies completions that have already arrived, without waiting.
    /// Returns how many were applied.
    pub fn process_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.rx.try_recv() {
            debug!("Controller received: {:?}", action);
            self.dispatch(action);
            applied += 1;
        }
        applied
    }

    /// Waits until the in-flight request (if any) has been committed.
    ///
    /// Returns immediately after `shutdown()`.
    pub async fn settle(&mut self) -> &GenerationState {
        while self.state.is_pending() && !self.cancel.is_cancelled() {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                Some(action) = self.rx.recv() => {
                    self.dispatch(action);
                }
            }
        }
        &self.state
    }

    /// Cancels every in-flight task. Their outcomes are never applied.
    pub fn shutdown(&mut self) {
        if !self.cancel.is_cancelled() {
            info!("Controller shutting down, cancelling in-flight work");
            self.cancel.cancel();
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
