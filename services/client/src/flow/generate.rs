//! services/client/src/flow/generate.rs
//!
//! The single-exchange generation flow: parse the prompt, pick the endpoint
//! and payload for the chosen layout, submit, and hand back the normalized
//! result. History persistence runs detached after the result is final.

use brochura_core::domain::{
    AssetRole, GenerationRequest, GenerationResult, Layout, NewBrochureRecord, ParsedPromptInfo,
    TrifoldOrder,
};
use brochura_core::ports::{
    BrochureGenerationService, HistoryService, PortError, PortResult, PromptParsingService,
};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::flow::prompt::{naive_location, parse_with_fallback};

/// Orchestrates one brochure generation from raw prompt to normalized result.
///
/// A new `generate` call pre-empts any still-running one: the earlier flow
/// terminates with `PortError::Cancelled` and writes no history, so the
/// displayed-result slot is never raced.
pub struct Orchestrator {
    parser: Arc<dyn PromptParsingService>,
    generator: Arc<dyn BrochureGenerationService>,
    history: Arc<dyn HistoryService>,
    active: Mutex<CancellationToken>,
}

impl Orchestrator {
    pub fn new(
        parser: Arc<dyn PromptParsingService>,
        generator: Arc<dyn BrochureGenerationService>,
        history: Arc<dyn HistoryService>,
    ) -> Self {
        Self {
            parser,
            generator,
            history,
            active: Mutex::new(CancellationToken::new()),
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> PortResult<GenerationResult> {
        let prompt = request.raw_prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(PortError::Validation("a prompt is required".to_string()));
        }

        // Cancel whatever flow is still in flight and take its place.
        let token = {
            let mut active = self.active.lock().expect("orchestrator lock poisoned");
            active.cancel();
            *active = CancellationToken::new();
            active.clone()
        };

        let flow = self.run_exchange(&prompt, request.layout);
        let (parsed, result) = tokio::select! {
            _ = token.cancelled() => {
                info!("Generation flow pre-empted by a newer submission");
                return Err(PortError::Cancelled);
            }
            outcome = flow => outcome?,
        };

        // Fire-and-forget: the record is persisted in the background and its
        // outcome observed only for logging. The result below is already
        // final whatever happens to the save.
        let record = build_history_record(&prompt, &parsed, &result);
        tokio::spawn(save_history(Arc::clone(&self.history), record));

        Ok(result)
    }

    async fn run_exchange(
        &self,
        prompt: &str,
        layout: Layout,
    ) -> PortResult<(ParsedPromptInfo, GenerationResult)> {
        let parsed = parse_with_fallback(self.parser.as_ref(), prompt).await;
        info!(
            "Parsed prompt into hotel '{}' / location '{}' (confidence {:.2})",
            parsed.hotel_name, parsed.location, parsed.confidence
        );

        let result = match layout {
            Layout::Trifold => {
                let location = if parsed.location.is_empty() {
                    naive_location(prompt)
                } else {
                    parsed.location.clone()
                };
                let order = TrifoldOrder {
                    hotel_name: parsed.hotel_name.clone(),
                    location,
                    amenities: None,
                    experience_text: Some(prompt.to_string()),
                    contact_info: None,
                };
                self.generator.generate_trifold(&order).await?
            }
            Layout::FullBleed => self.generator.generate_from_prompt(prompt, layout).await?,
        };

        Ok((parsed, result))
    }
}

fn build_history_record(
    prompt: &str,
    parsed: &ParsedPromptInfo,
    result: &GenerationResult,
) -> NewBrochureRecord {
    let hotel_name = result
        .hotel_name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| parsed.hotel_name.clone());
    let location = result
        .location
        .clone()
        .filter(|loc| !loc.is_empty())
        .unwrap_or_else(|| {
            if parsed.location.is_empty() {
                naive_location(prompt)
            } else {
                parsed.location.clone()
            }
        });

    NewBrochureRecord {
        hotel_name,
        location,
        file_path: result.document_url.clone(),
        exterior_image: result.asset_urls.get(&AssetRole::Exterior).cloned(),
        room_image: result.asset_urls.get(&AssetRole::Room).cloned(),
        restaurant_image: result.asset_urls.get(&AssetRole::Restaurant).cloned(),
        prompt: prompt.to_string(),
    }
}

/// The detached history write. Failures are logged and dropped: they must
/// never surface to the caller, change the generation outcome, or retry.
pub(crate) async fn save_history(history: Arc<dyn HistoryService>, record: NewBrochureRecord) {
    info!("Saving brochure history for '{}'", record.hotel_name);
    if let Err(e) = history.save(&record).await {
        error!("Failed to save brochure history: {}", e);
    }
}
