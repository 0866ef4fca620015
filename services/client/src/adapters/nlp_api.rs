//! services/client/src/adapters/nlp_api.rs
//!
//! Adapter for the NLP prompt-parsing service. Implements the
//! `PromptParsingService` port from the `core` crate.
//!
//! This is the primary parsing path only; the local heuristic fallback lives
//! with the orchestrator, which calls it whenever this adapter errors.

use async_trait::async_trait;
use brochura_core::domain::ParsedPromptInfo;
use brochura_core::ports::{PortResult, PromptParsingService};
use serde::{Deserialize, Serialize};

use crate::adapters::http::{decode_json, Backend};

#[derive(Clone)]
pub struct NlpBackend {
    http: Backend,
}

impl NlpBackend {
    pub fn new(http: Backend) -> Self {
        Self { http }
    }
}

#[derive(Serialize)]
struct ParseWire<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct ParsedWire {
    hotel_name: String,
    #[serde(default)]
    location: Option<String>,
    confidence: f32,
}

#[async_trait]
impl PromptParsingService for NlpBackend {
    async fn parse(&self, prompt: &str) -> PortResult<ParsedPromptInfo> {
        let response = self
            .http
            .post_json("/parse-prompt", &ParseWire { prompt })
            .await?;
        let wire: ParsedWire = decode_json(response).await?;
        Ok(ParsedPromptInfo {
            hotel_name: wire.hotel_name,
            location: wire.location.unwrap_or_default(),
            confidence: wire.confidence,
        })
    }
}
