//! services/client/src/flow/prompt.rs
//!
//! Prompt parsing with a deterministic local fallback.
//!
//! The primary path asks the NLP backend. Any failure of that exchange —
//! network, non-2xx, undecodable body — degrades to the heuristic below and
//! tags the result with a low confidence score. A low confidence from the
//! NLP service itself is returned as-is and never triggers the fallback.

use brochura_core::domain::ParsedPromptInfo;
use brochura_core::ports::PromptParsingService;
use regex::Regex;
use tracing::warn;

/// Confidence assigned to heuristic extractions.
pub const FALLBACK_CONFIDENCE: f32 = 0.3;

/// Parses a prompt through the NLP port, degrading to `heuristic_extract`
/// on any error. Total: always produces a value.
pub async fn parse_with_fallback(
    parser: &dyn PromptParsingService,
    prompt: &str,
) -> ParsedPromptInfo {
    match parser.parse(prompt).await {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("NLP prompt parsing failed ({}); using heuristic extraction", e);
            heuristic_extract(prompt)
        }
    }
}

/// Rule-based extraction of hotel name and location from a free-text prompt.
///
/// Strips a leading filler phrase ("generate a brochure for ..."), then
/// splits on the first literal " in ": the text before it (capped at four
/// words) is the hotel name, the first token after it is the location.
pub fn heuristic_extract(prompt: &str) -> ParsedPromptInfo {
    let filler =
        Regex::new(r"(?i)^(generate|create|make|design)\s+(a|an)\s+brochure\s+(for|of|about)?\s*")
            .unwrap();
    let cleaned = filler.replace(prompt.trim(), "");

    let (hotel_part, location) = match cleaned.split_once(" in ") {
        Some((before, after)) => (
            before,
            after.split_whitespace().next().unwrap_or("").to_string(),
        ),
        None => (cleaned.as_ref(), String::new()),
    };

    let hotel_name = hotel_part
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ");

    ParsedPromptInfo {
        hotel_name,
        location,
        confidence: FALLBACK_CONFIDENCE,
    }
}

/// Last-resort location guess used for the trifold payload when the parsed
/// location came back empty: the first token after the last " in ".
pub fn naive_location(prompt: &str) -> String {
    prompt
        .rsplit(" in ")
        .next()
        .unwrap_or(prompt)
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string()
}
