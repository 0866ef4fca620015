//! End-to-end tests of the generation orchestration against mock ports.

use async_trait::async_trait;
use brochura_core::domain::{
    AssetRole, BrochureRecord, GenerationRequest, GenerationResult, Layout, NewBrochureRecord,
    ParsedPromptInfo, TaskStatus, TrifoldOrder,
};
use brochura_core::ports::{
    BrochureGenerationService, HistoryService, PortError, PortResult, PromptParsingService,
};
use client_lib::flow::Orchestrator;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

//=========================================================================================
// Mock Ports
//=========================================================================================

struct NlpDown;

#[async_trait]
impl PromptParsingService for NlpDown {
    async fn parse(&self, _prompt: &str) -> PortResult<ParsedPromptInfo> {
        Err(PortError::Network("connection refused".to_string()))
    }
}

struct NlpCanned(ParsedPromptInfo);

#[async_trait]
impl PromptParsingService for NlpCanned {
    async fn parse(&self, _prompt: &str) -> PortResult<ParsedPromptInfo> {
        Ok(self.0.clone())
    }
}

/// Records every order/prompt it sees and answers with a canned result.
#[derive(Default)]
struct RecordingGenerator {
    trifold_orders: Mutex<Vec<TrifoldOrder>>,
    prompts: Mutex<Vec<(String, Layout)>>,
    /// When set, generation calls stall until cancelled.
    hang: bool,
}

#[async_trait]
impl BrochureGenerationService for RecordingGenerator {
    async fn generate_trifold(&self, order: &TrifoldOrder) -> PortResult<GenerationResult> {
        self.trifold_orders.lock().unwrap().push(order.clone());
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(GenerationResult {
            document_url: "http://localhost:8006/brochures/trifold.pdf".to_string(),
            asset_urls: BTreeMap::new(),
            hotel_name: None,
            location: None,
        })
    }

    async fn generate_from_prompt(
        &self,
        prompt: &str,
        layout: Layout,
    ) -> PortResult<GenerationResult> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), layout));
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(GenerationResult {
            document_url: "http://localhost:8006/brochures/full.pdf".to_string(),
            asset_urls: BTreeMap::from([
                (
                    AssetRole::Exterior,
                    "http://localhost:8006/images/e.png".to_string(),
                ),
                (
                    AssetRole::Room,
                    "http://localhost:8006/images/r.png".to_string(),
                ),
                (
                    AssetRole::Restaurant,
                    "http://localhost:8006/images/d.png".to_string(),
                ),
            ]),
            hotel_name: Some("Echoed Hotel".to_string()),
            location: Some("Echoed City".to_string()),
        })
    }

    async fn submit_job(
        &self,
        _hotel_name: &str,
        _location: &str,
        _layout: Layout,
    ) -> PortResult<String> {
        unimplemented!("not used in these tests")
    }

    async fn job_status(&self, _task_id: &str) -> PortResult<TaskStatus> {
        unimplemented!("not used in these tests")
    }

    async fn download(&self, _url: &str) -> PortResult<Vec<u8>> {
        unimplemented!("not used in these tests")
    }
}

/// Forwards every saved record to the test through a channel.
struct ChannelHistory {
    tx: mpsc::UnboundedSender<NewBrochureRecord>,
    fail: bool,
}

#[async_trait]
impl HistoryService for ChannelHistory {
    async fn save(&self, record: &NewBrochureRecord) -> PortResult<()> {
        self.tx.send(record.clone()).ok();
        if self.fail {
            Err(PortError::Backend("history backend down".to_string()))
        } else {
            Ok(())
        }
    }

    async fn recent(&self, _limit: Option<u32>) -> PortResult<Vec<BrochureRecord>> {
        Ok(Vec::new())
    }
}

fn history_channel(fail: bool) -> (Arc<ChannelHistory>, mpsc::UnboundedReceiver<NewBrochureRecord>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(ChannelHistory { tx, fail }), rx)
}

async fn next_record(rx: &mut mpsc::UnboundedReceiver<NewBrochureRecord>) -> NewBrochureRecord {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("history save was never attempted")
        .expect("history channel closed")
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn trifold_flow_uses_the_parsed_fields_and_the_raw_prompt() {
    let generator = Arc::new(RecordingGenerator::default());
    let (history, mut rx) = history_channel(false);
    let orchestrator = Orchestrator::new(
        Arc::new(NlpCanned(ParsedPromptInfo {
            hotel_name: "Sunset Paradise Resort".to_string(),
            location: "Maldives".to_string(),
            confidence: 0.9,
        })),
        Arc::clone(&generator) as Arc<dyn BrochureGenerationService>,
        history,
    );

    let prompt = "Generate a brochure for Sunset Paradise Resort in Maldives";
    let result = orchestrator
        .generate(&GenerationRequest {
            raw_prompt: prompt.to_string(),
            layout: Layout::Trifold,
        })
        .await
        .unwrap();

    assert!(result.document_url.ends_with("/brochures/trifold.pdf"));

    let orders = generator.trifold_orders.lock().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].hotel_name, "Sunset Paradise Resort");
    assert_eq!(orders[0].location, "Maldives");
    assert_eq!(orders[0].experience_text.as_deref(), Some(prompt));
    // Absent fields signal "use backend defaults".
    assert!(orders[0].amenities.is_none());
    assert!(orders[0].contact_info.is_none());
    drop(orders);

    let record = next_record(&mut rx).await;
    assert_eq!(record.hotel_name, "Sunset Paradise Resort");
    assert_eq!(record.location, "Maldives");
    assert_eq!(record.file_path, result.document_url);
    assert_eq!(record.prompt, prompt);
}

#[tokio::test]
async fn trifold_location_is_rederived_when_the_parse_leaves_it_empty() {
    let generator = Arc::new(RecordingGenerator::default());
    let (history, _rx) = history_channel(false);
    let orchestrator = Orchestrator::new(
        Arc::new(NlpCanned(ParsedPromptInfo {
            hotel_name: "Hotel Lux".to_string(),
            location: String::new(),
            confidence: 0.7,
        })),
        Arc::clone(&generator) as Arc<dyn BrochureGenerationService>,
        history,
    );

    // The NLP service found no location, so the payload location comes from
    // the naive re-derivation over the raw prompt.
    orchestrator
        .generate(&GenerationRequest {
            raw_prompt: "Generate a brochure for Hotel Lux in Paris".to_string(),
            layout: Layout::Trifold,
        })
        .await
        .unwrap();

    let orders = generator.trifold_orders.lock().unwrap();
    assert_eq!(orders[0].location, "Paris");
}

#[tokio::test]
async fn full_bleed_flow_sends_the_prompt_and_persists_the_asset_urls() {
    let generator = Arc::new(RecordingGenerator::default());
    let (history, mut rx) = history_channel(false);
    let orchestrator = Orchestrator::new(
        Arc::new(NlpDown),
        Arc::clone(&generator) as Arc<dyn BrochureGenerationService>,
        history,
    );

    let prompt = "Create a brochure for Hotel Lux in Paris";
    let result = orchestrator
        .generate(&GenerationRequest {
            raw_prompt: prompt.to_string(),
            layout: Layout::FullBleed,
        })
        .await
        .unwrap();

    assert_eq!(result.asset_urls.len(), 3);

    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.as_slice(), &[(prompt.to_string(), Layout::FullBleed)]);
    drop(prompts);

    let record = next_record(&mut rx).await;
    // Backend-echoed names win over the parse.
    assert_eq!(record.hotel_name, "Echoed Hotel");
    assert_eq!(record.location, "Echoed City");
    assert_eq!(
        record.exterior_image.as_deref(),
        Some("http://localhost:8006/images/e.png")
    );
    assert_eq!(
        record.restaurant_image.as_deref(),
        Some("http://localhost:8006/images/d.png")
    );
}

#[tokio::test]
async fn a_failing_history_save_leaves_the_result_intact() {
    let generator = Arc::new(RecordingGenerator::default());
    let (history, mut rx) = history_channel(true);
    let orchestrator = Orchestrator::new(
        Arc::new(NlpDown),
        Arc::clone(&generator) as Arc<dyn BrochureGenerationService>,
        history,
    );

    let result = orchestrator
        .generate(&GenerationRequest {
            raw_prompt: "Create a brochure for Hotel Lux in Paris".to_string(),
            layout: Layout::FullBleed,
        })
        .await
        .unwrap();

    // The save was attempted and failed, yet the flow already returned Ok.
    next_record(&mut rx).await;
    assert!(result.document_url.ends_with("/brochures/full.pdf"));
}

#[tokio::test]
async fn an_empty_prompt_fails_before_any_network_call() {
    let generator = Arc::new(RecordingGenerator::default());
    let (history, _rx) = history_channel(false);
    let orchestrator = Orchestrator::new(
        Arc::new(NlpDown),
        Arc::clone(&generator) as Arc<dyn BrochureGenerationService>,
        history,
    );

    let outcome = orchestrator
        .generate(&GenerationRequest {
            raw_prompt: "   ".to_string(),
            layout: Layout::Trifold,
        })
        .await;

    assert!(matches!(outcome, Err(PortError::Validation(_))));
    assert!(generator.trifold_orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn a_newer_submission_cancels_the_one_in_flight() {
    let hanging = Arc::new(RecordingGenerator {
        hang: true,
        ..Default::default()
    });
    let (history, mut rx) = history_channel(false);
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(NlpDown),
        Arc::clone(&hanging) as Arc<dyn BrochureGenerationService>,
        history,
    ));

    let first = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move {
            orchestrator
                .generate(&GenerationRequest {
                    raw_prompt: "Create a brochure for Hotel Lux in Paris".to_string(),
                    layout: Layout::FullBleed,
                })
                .await
        }
    });

    // Wait until the first flow has reached the backend call.
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            if !hanging.prompts.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    // The second submission pre-empts it. It hangs too, so race it against
    // the first flow's outcome; we only care that the first one cancels.
    let orchestrator_two = Arc::clone(&orchestrator);
    let second = tokio::spawn(async move {
        orchestrator_two
            .generate(&GenerationRequest {
                raw_prompt: "Create a brochure for Hotel Nox in Oslo".to_string(),
                layout: Layout::FullBleed,
            })
            .await
    });

    let first_outcome = tokio::time::timeout(Duration::from_secs(1), first)
        .await
        .expect("first flow never resolved")
        .unwrap();
    assert!(matches!(first_outcome, Err(PortError::Cancelled)));

    // A cancelled flow writes no history.
    assert!(rx.try_recv().is_err());
    second.abort();
}
