//! # Generation Pipeline
//!
//! One submission runs as fetch → verify-loadable → commit:
//!
//! ```text
//! prompt ──► ImageGenerator::generate ──► classify ──► ImagePreloader::preload ──► outcome
//!                                      (explicit /       (fetch + decode)
//!                                       missing)
//! └────────────────────────────── optional timeout bounds all of it ──────────────┘
//! ```
//!
//! `run` always resolves to exactly one outcome: generator errors, panics in
//! either stage, and timeouts become `GenerationFailure::Fault`. The commit
//! itself happens in `update()` when the outcome comes back as an action.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::action::{Action, GenerationJob};
use crate::generation::{
    GenerationFailure, GenerationOutcome, GenerationResponse, ImageGenerator, ImagePreloader,
};

pub struct Pipeline {
    generator: Arc<dyn ImageGenerator>,
    preloader: Arc<dyn ImagePreloader>,
    timeout: Option<Duration>,
}

impl Pipeline {
    pub fn new(generator: Arc<dyn ImageGenerator>, preloader: Arc<dyn ImagePreloader>) -> Self {
        Self {
            generator,
            preloader,
            timeout: None,
        }
    }

    /// Bounds the whole request. Without it a hung call stays pending.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Runs both stages for `prompt` and never unwinds.
    ///
    /// The timeout, when set, bounds fetch and preload together.
    pub async fn run(&self, prompt: &str) -> GenerationOutcome {
        let stages = AssertUnwindSafe(self.run_stages(prompt)).catch_unwind();
        let caught = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, stages).await {
                Ok(caught) => caught,
                Err(_) => {
                    warn!("Generation timed out after {:?}", limit);
                    return Err(GenerationFailure::Fault(Some(format!(
                        "Request timed out after {}s",
                        limit.as_secs()
                    ))));
                }
            },
            None => stages.await,
        };
        match caught {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("Generation pipeline panicked: {:?}", message);
                Err(GenerationFailure::Fault(message))
            }
        }
    }

    async fn run_stages(&self, prompt: &str) -> GenerationOutcome {
        let response = self.fetch(prompt).await?;
        let url = response.into_image_url()?;
        debug!("Generator returned image location: {}", url);
        self.preloader
            .preload(&url)
            .await
            .map_err(|e| GenerationFailure::Preload(e.to_string()))
    }

    async fn fetch(&self, prompt: &str) -> Result<GenerationResponse, GenerationFailure> {
        self.generator.generate(prompt).await.map_err(|e| {
            warn!("Generator {} failed: {}", self.generator.name(), e);
            GenerationFailure::Fault(Some(e.user_message()))
        })
    }

    /// Runs `job` on the tokio runtime and reports the outcome on `tx`.
    ///
    /// Once `cancel` fires the task stops and sends nothing.
    pub fn spawn(
        self: &Arc<Self>,
        job: GenerationJob,
        cancel: CancellationToken,
        tx: UnboundedSender<Action>,
    ) -> JoinHandle<()> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Generation {} cancelled", job.request_id);
                    return;
                }
                outcome = pipeline.run(&job.prompt) => outcome,
            };

            if cancel.is_cancelled() {
                info!("Generation {} finished after cancellation, discarding", job.request_id);
                return;
            }
            if tx
                .send(Action::GenerationFinished {
                    request_id: job.request_id,
                    outcome,
                })
                .is_err()
            {
                warn!(
                    "Failed to send outcome for generation {}: receiver dropped",
                    job.request_id
                );
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::RequestId;
    use crate::generation::{GeneratorError, PreloadError};
    use crate::test_support::{
        FailingPreloader, HangingGenerator, HangingPreloader, PanickingGenerator, StaticGenerator,
        StaticPreloader,
    };
    use tokio_test::{assert_pending, task};

    fn pipeline(generator: impl ImageGenerator + 'static) -> Pipeline {
        Pipeline::new(Arc::new(generator), Arc::new(StaticPreloader))
    }

    #[tokio::test]
    async fn test_success_runs_preload() {
        let outcome = pipeline(StaticGenerator::image("https://img/x.png"))
            .run("a fox")
            .await;
        let image = outcome.unwrap();
        assert_eq!(image.url, "https://img/x.png");
    }

    #[tokio::test]
    async fn test_generator_receives_untrimmed_prompt() {
        let generator = Arc::new(StaticGenerator::image("X"));
        let pipeline = Pipeline::new(generator.clone(), Arc::new(StaticPreloader));
        pipeline.run("  a fox  ").await.unwrap();
        assert_eq!(generator.prompts(), vec!["  a fox  ".to_string()]);
    }

    #[tokio::test]
    async fn test_explicit_failure() {
        let outcome = pipeline(StaticGenerator::failure(Some("bad prompt")))
            .run("a fox")
            .await;
        assert_eq!(
            outcome.unwrap_err(),
            GenerationFailure::Explicit(Some("bad prompt".into()))
        );
    }

    #[tokio::test]
    async fn test_success_without_url_is_missing_result() {
        let generator = StaticGenerator::response(GenerationResponse {
            success: true,
            ..Default::default()
        });
        let outcome = pipeline(generator).run("a fox").await;
        assert_eq!(outcome.unwrap_err(), GenerationFailure::MissingResult);
    }

    #[tokio::test]
    async fn test_generator_error_is_fault() {
        let generator =
            StaticGenerator::error(GeneratorError::Network("network down".into()));
        let outcome = pipeline(generator).run("a fox").await;
        assert_eq!(
            outcome.unwrap_err(),
            GenerationFailure::Fault(Some("network down".into()))
        );
    }

    #[tokio::test]
    async fn test_panic_is_fault_with_message() {
        let outcome = pipeline(PanickingGenerator).run("a fox").await;
        assert_eq!(
            outcome.unwrap_err(),
            GenerationFailure::Fault(Some("generator exploded".into()))
        );
    }

    #[tokio::test]
    async fn test_preload_failure() {
        let pipeline = Pipeline::new(
            Arc::new(StaticGenerator::image("https://img/gone.png")),
            Arc::new(FailingPreloader(PreloadError::Status(404))),
        );
        let outcome = pipeline.run("a fox").await;
        assert_eq!(
            outcome.unwrap_err(),
            GenerationFailure::Preload("HTTP 404".into())
        );
    }

    #[test]
    fn test_hung_generator_stays_pending_without_timeout() {
        let pipeline = pipeline(HangingGenerator);
        let mut run = task::spawn(pipeline.run("a fox"));
        assert_pending!(run.poll());
        assert_pending!(run.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_fault() {
        let pipeline = pipeline(HangingGenerator).with_timeout(Some(Duration::from_secs(5)));
        let outcome = pipeline.run("a fox").await;
        assert_eq!(
            outcome.unwrap_err(),
            GenerationFailure::Fault(Some("Request timed out after 5s".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_covers_preload_stage() {
        let pipeline = Pipeline::new(
            Arc::new(StaticGenerator::image("https://slow.example/x.png")),
            Arc::new(HangingPreloader),
        )
        .with_timeout(Some(Duration::from_secs(5)));

        let outcome = tokio::time::timeout(Duration::from_secs(3600), pipeline.run("a fox"))
            .await
            .expect("preload stage was not bounded by the request timeout");
        assert_eq!(
            outcome.unwrap_err(),
            GenerationFailure::Fault(Some("Request timed out after 5s".into()))
        );
    }

    #[tokio::test]
    async fn test_api_fault_hides_html_body() {
        let generator = StaticGenerator::error(GeneratorError::Api {
            status: 502,
            message: "<html><body>Bad Gateway</body></html>".into(),
        });
        let outcome = pipeline(generator).run("a fox").await;
        assert_eq!(
            outcome.unwrap_err(),
            GenerationFailure::Fault(Some("API error (HTTP 502)".into()))
        );
    }

    #[tokio::test]
    async fn test_spawn_reports_outcome() {
        let pipeline = Arc::new(pipeline(StaticGenerator::image("X")));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let job = GenerationJob {
            request_id: RequestId::new(),
            prompt: "a fox".into(),
        };

        pipeline
            .spawn(job.clone(), CancellationToken::new(), tx)
            .await
            .unwrap();

        match rx.recv().await {
            Some(Action::GenerationFinished {
                request_id,
                outcome,
            }) => {
                assert_eq!(request_id, job.request_id);
                assert_eq!(outcome.unwrap().url, "X");
            }
            other => panic!("expected GenerationFinished, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_spawn_sends_nothing() {
        let pipeline = Arc::new(pipeline(HangingGenerator));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let job = GenerationJob {
            request_id: RequestId::new(),
            prompt: "a fox".into(),
        };

        let handle = pipeline.spawn(job, cancel.clone(), tx);
        cancel.cancel();
        handle.await.unwrap();

        // Sender was moved into the finished task and dropped
        assert!(rx.recv().await.is_none());
    }
}
