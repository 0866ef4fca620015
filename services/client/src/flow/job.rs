//! services/client/src/flow/job.rs
//!
//! The legacy job-based generation path: submit, then poll the task status
//! on a fixed interval until it leaves "processing".
//!
//! The loop is bounded by a configured attempt budget; exhausting it is its
//! own terminal state, distinct from a backend-reported failure. The task
//! is cancellable between polls.

use brochura_core::domain::{AssetRole, GenerationResult, JobPhase, Layout, TaskStatus};
use brochura_core::ports::{BrochureGenerationService, PortError, PortResult};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::adapters::brochure_api::{brochure_url, image_url};

#[derive(Debug, Clone)]
pub struct JobSettings {
    /// Fixed delay between status polls.
    pub interval: Duration,
    /// Terminal timeout after this many polls.
    pub max_attempts: u32,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 60,
        }
    }
}

fn advance(phase: &mut JobPhase, next: JobPhase, task_id: &str) {
    *phase = next;
    info!("Generation job {}: {:?}", task_id, next);
}

/// Runs one job to a terminal state: submitted, polled, then completed,
/// failed, timed out, or cancelled.
pub async fn run_job(
    generator: &dyn BrochureGenerationService,
    brochure_base_url: &str,
    hotel_name: &str,
    location: &str,
    layout: Layout,
    settings: &JobSettings,
    cancel: &CancellationToken,
) -> PortResult<GenerationResult> {
    let mut phase = JobPhase::Idle;

    let task_id = generator.submit_job(hotel_name, location, layout).await?;
    advance(&mut phase, JobPhase::Submitted, &task_id);

    for _attempt in 0..settings.max_attempts {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                advance(&mut phase, JobPhase::Cancelled, &task_id);
                return Err(PortError::Cancelled);
            }
            _ = tokio::time::sleep(settings.interval) => {}
        }

        if phase != JobPhase::Polling {
            advance(&mut phase, JobPhase::Polling, &task_id);
        }

        match generator.job_status(&task_id).await? {
            TaskStatus::Processing => continue,
            TaskStatus::Completed {
                file_path,
                exterior_image,
            } => {
                advance(&mut phase, JobPhase::Completed, &task_id);

                let mut asset_urls = BTreeMap::new();
                if let Some(image) = exterior_image {
                    asset_urls.insert(AssetRole::Exterior, absolute_image(brochure_base_url, &image));
                }
                return Ok(GenerationResult {
                    document_url: absolute_document(brochure_base_url, &file_path),
                    asset_urls,
                    hotel_name: Some(hotel_name.to_string()),
                    location: Some(location.to_string()),
                });
            }
            TaskStatus::Failed { message } => {
                advance(&mut phase, JobPhase::Failed, &task_id);
                return Err(PortError::Backend(
                    message.unwrap_or_else(|| "Brochure generation failed".to_string()),
                ));
            }
        }
    }

    advance(&mut phase, JobPhase::TimedOut, &task_id);
    warn!(
        "Generation job {} still processing after {} polls; giving up",
        task_id, settings.max_attempts
    );
    Err(PortError::Timeout(format!(
        "generation task {} did not finish within {} polls",
        task_id, settings.max_attempts
    )))
}

fn absolute_document(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        brochure_url(base, path.trim_start_matches("generated_brochures/"))
    }
}

fn absolute_image(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        image_url(base, path.trim_start_matches("generated_images/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use brochura_core::domain::TrifoldOrder;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// A generator whose job finishes after a fixed number of polls.
    struct ScriptedGenerator {
        polls_until_done: u32,
        polls: AtomicU32,
        terminal: TaskStatus,
    }

    impl ScriptedGenerator {
        fn completing_after(polls: u32) -> Self {
            Self {
                polls_until_done: polls,
                polls: AtomicU32::new(0),
                terminal: TaskStatus::Completed {
                    file_path: "Hotel_Lux_full_bleed_brochure.png".to_string(),
                    exterior_image: Some("Hotel_Lux_exterior.png".to_string()),
                },
            }
        }

        fn failing_after(polls: u32) -> Self {
            Self {
                polls_until_done: polls,
                polls: AtomicU32::new(0),
                terminal: TaskStatus::Failed {
                    message: Some("renderer crashed".to_string()),
                },
            }
        }
    }

    #[async_trait]
    impl BrochureGenerationService for ScriptedGenerator {
        async fn generate_trifold(&self, _order: &TrifoldOrder) -> PortResult<GenerationResult> {
            unimplemented!("not used by the job path")
        }

        async fn generate_from_prompt(
            &self,
            _prompt: &str,
            _layout: Layout,
        ) -> PortResult<GenerationResult> {
            unimplemented!("not used by the job path")
        }

        async fn submit_job(
            &self,
            _hotel_name: &str,
            _location: &str,
            _layout: Layout,
        ) -> PortResult<String> {
            Ok("task-1".to_string())
        }

        async fn job_status(&self, _task_id: &str) -> PortResult<TaskStatus> {
            let seen = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            if seen >= self.polls_until_done {
                Ok(self.terminal.clone())
            } else {
                Ok(TaskStatus::Processing)
            }
        }

        async fn download(&self, _url: &str) -> PortResult<Vec<u8>> {
            unimplemented!("not used by the job path")
        }
    }

    fn fast_settings(max_attempts: u32) -> JobSettings {
        JobSettings {
            interval: Duration::ZERO,
            max_attempts,
        }
    }

    #[tokio::test]
    async fn a_job_that_completes_normalizes_into_a_result() {
        let generator = ScriptedGenerator::completing_after(3);
        let result = run_job(
            &generator,
            "http://localhost:8006",
            "Hotel Lux",
            "Paris",
            Layout::FullBleed,
            &fast_settings(10),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(
            result.document_url,
            "http://localhost:8006/brochures/Hotel_Lux_full_bleed_brochure.png"
        );
        assert_eq!(
            result.asset_urls[&AssetRole::Exterior],
            "http://localhost:8006/images/Hotel_Lux_exterior.png"
        );
        assert_eq!(result.hotel_name.as_deref(), Some("Hotel Lux"));
    }

    #[tokio::test]
    async fn a_failed_job_surfaces_the_backend_message_without_retry() {
        let generator = ScriptedGenerator::failing_after(2);
        let outcome = run_job(
            &generator,
            "http://localhost:8006",
            "Hotel Lux",
            "Paris",
            Layout::FullBleed,
            &fast_settings(10),
            &CancellationToken::new(),
        )
        .await;

        match outcome {
            Err(PortError::Backend(msg)) => assert_eq!(msg, "renderer crashed"),
            other => panic!("expected backend failure, got {:?}", other),
        }
        // Terminal: exactly two polls, no retry after the failure.
        assert_eq!(generator.polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausting_the_attempt_budget_is_a_timeout() {
        let generator = ScriptedGenerator::completing_after(100);
        let outcome = run_job(
            &generator,
            "http://localhost:8006",
            "Hotel Lux",
            "Paris",
            Layout::FullBleed,
            &fast_settings(5),
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(outcome, Err(PortError::Timeout(_))));
        assert_eq!(generator.polls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn a_pre_cancelled_job_never_polls() {
        let generator = ScriptedGenerator::completing_after(1);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = run_job(
            &generator,
            "http://localhost:8006",
            "Hotel Lux",
            "Paris",
            Layout::FullBleed,
            &fast_settings(10),
            &cancel,
        )
        .await;

        assert!(matches!(outcome, Err(PortError::Cancelled)));
        assert_eq!(generator.polls.load(Ordering::SeqCst), 0);
    }
}
