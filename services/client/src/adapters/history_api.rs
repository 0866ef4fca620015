//! services/client/src/adapters/history_api.rs
//!
//! Adapter for the account backend's brochure-history resource. Implements
//! the `HistoryService` port from the `core` crate.
//!
//! Rows read back may carry either absolute URLs (written by this client)
//! or bare relative paths (written by older deployments); relative ones are
//! rewritten against the brochure service base before they reach a view.

use async_trait::async_trait;
use brochura_core::domain::{BrochureRecord, NewBrochureRecord};
use brochura_core::ports::{HistoryService, PortResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adapters::brochure_api::{brochure_url, image_url};
use crate::adapters::http::{decode_json, Backend};

#[derive(Clone)]
pub struct HistoryBackend {
    http: Backend,
    brochure_base_url: String,
}

impl HistoryBackend {
    pub fn new(http: Backend, brochure_base_url: String) -> Self {
        Self {
            http,
            brochure_base_url,
        }
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveWire<'a> {
    hotel_name: &'a str,
    location: &'a str,
    file_path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    exterior_image: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_image: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    restaurant_image: Option<&'a str>,
    prompt: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordWire {
    id: Option<Uuid>,
    hotel_name: String,
    #[serde(default)]
    location: Option<String>,
    file_path: String,
    exterior_image: Option<String>,
    room_image: Option<String>,
    restaurant_image: Option<String>,
    prompt: Option<String>,
    created_at: Option<String>,
}

#[derive(Serialize)]
struct RecentQuery {
    limit: u32,
}

impl RecordWire {
    fn into_domain(self, brochure_base: &str) -> BrochureRecord {
        BrochureRecord {
            id: self.id,
            hotel_name: self.hotel_name,
            location: self.location.unwrap_or_default(),
            file_path: absolutize(&self.file_path, |p| brochure_url(brochure_base, p)),
            exterior_image: self
                .exterior_image
                .map(|p| absolutize(&p, |p| image_url(brochure_base, p))),
            room_image: self
                .room_image
                .map(|p| absolutize(&p, |p| image_url(brochure_base, p))),
            restaurant_image: self
                .restaurant_image
                .map(|p| absolutize(&p, |p| image_url(brochure_base, p))),
            prompt: self.prompt,
            created_at: parse_history_date(self.created_at.as_deref()),
        }
    }
}

fn absolutize(path: &str, join: impl Fn(&str) -> String) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        join(path)
    }
}

/// The account backend serializes timestamps without an offset; accept both
/// that and full RFC 3339.
fn parse_history_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

//=========================================================================================
// `HistoryService` Trait Implementation
//=========================================================================================

#[async_trait]
impl HistoryService for HistoryBackend {
    async fn save(&self, record: &NewBrochureRecord) -> PortResult<()> {
        let body = SaveWire {
            hotel_name: &record.hotel_name,
            location: &record.location,
            file_path: &record.file_path,
            exterior_image: record.exterior_image.as_deref(),
            room_image: record.room_image.as_deref(),
            restaurant_image: record.restaurant_image.as_deref(),
            prompt: &record.prompt,
        };
        self.http.post_json("/api/brochures/save", &body).await?;
        Ok(())
    }

    async fn recent(&self, limit: Option<u32>) -> PortResult<Vec<BrochureRecord>> {
        let query = RecentQuery {
            limit: limit.unwrap_or(10),
        };
        let response = self
            .http
            .get_with_query("/api/brochures/recent", &query)
            .await?;
        let wires: Vec<RecordWire> = decode_json(response).await?;
        Ok(wires
            .into_iter()
            .map(|w| w.into_domain(&self.brochure_base_url))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_rewritten_against_the_brochure_service() {
        let wire = RecordWire {
            id: None,
            hotel_name: "Grand Plaza".to_string(),
            location: Some("Vienna".to_string()),
            file_path: "Grand_Plaza_brochure.pdf".to_string(),
            exterior_image: Some("Grand_Plaza_exterior.png".to_string()),
            room_image: None,
            restaurant_image: None,
            prompt: None,
            created_at: None,
        };
        let record = wire.into_domain("http://localhost:8006");
        assert_eq!(
            record.file_path,
            "http://localhost:8006/brochures/Grand_Plaza_brochure.pdf"
        );
        assert_eq!(
            record.exterior_image.as_deref(),
            Some("http://localhost:8006/images/Grand_Plaza_exterior.png")
        );
    }

    #[test]
    fn absolute_paths_pass_through_untouched() {
        let wire = RecordWire {
            id: None,
            hotel_name: "Grand Plaza".to_string(),
            location: None,
            file_path: "https://cdn.example.com/b.pdf".to_string(),
            exterior_image: None,
            room_image: None,
            restaurant_image: None,
            prompt: None,
            created_at: None,
        };
        let record = wire.into_domain("http://localhost:8006");
        assert_eq!(record.file_path, "https://cdn.example.com/b.pdf");
        assert_eq!(record.location, "");
    }

    #[test]
    fn history_dates_parse_with_and_without_an_offset() {
        assert!(parse_history_date(Some("2025-11-02T10:30:00")).is_some());
        assert!(parse_history_date(Some("2025-11-02T10:30:00.123456")).is_some());
        assert!(parse_history_date(Some("2025-11-02T10:30:00Z")).is_some());
        assert!(parse_history_date(Some("yesterday")).is_none());
        assert!(parse_history_date(None).is_none());
    }
}
