//! crates/brochura_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any backend wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Brochure document style selector. Determines both the backend endpoint
/// and the payload shape of a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Trifold,
    FullBleed,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Trifold => "trifold",
            Layout::FullBleed => "full_bleed",
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trifold" => Ok(Layout::Trifold),
            "full_bleed" => Ok(Layout::FullBleed),
            other => Err(format!("unknown layout '{}'", other)),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The account record returned by the auth backend at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_date: Option<DateTime<Utc>>,
    pub last_login_date: Option<DateTime<Utc>>,
}

/// An authenticated session. The token is stored raw; the `Bearer ` prefix
/// is attached at request time. Presence of a token implies presence of the
/// user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Everything the user submits from the generation form. Ephemeral.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub raw_prompt: String,
    pub layout: Layout,
}

/// Structured hotel/location fields derived from a free-text prompt,
/// either by the NLP backend or by the local heuristic fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPromptInfo {
    pub hotel_name: String,
    pub location: String,
    pub confidence: f32,
}

/// Role of a generated image asset within a brochure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AssetRole {
    Exterior,
    Room,
    Restaurant,
}

impl AssetRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetRole::Exterior => "exterior",
            AssetRole::Room => "room",
            AssetRole::Restaurant => "restaurant",
        }
    }
}

impl fmt::Display for AssetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The normalized outcome of a successful generation, whatever the layout.
///
/// `hotel_name` and `location` are echoed by some backends and feed the
/// history record; they are not part of the displayed result.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub document_url: String,
    pub asset_urls: BTreeMap<AssetRole, String>,
    pub hotel_name: Option<String>,
    pub location: Option<String>,
}

/// One amenity entry on a trifold order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Amenity {
    pub title: String,
    pub description: String,
}

/// Contact block for a trifold order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

/// Payload of a trifold generation request. Absent optional fields tell the
/// backend to fill in its own defaults.
#[derive(Debug, Clone)]
pub struct TrifoldOrder {
    pub hotel_name: String,
    pub location: String,
    pub amenities: Option<Vec<Amenity>>,
    pub experience_text: Option<String>,
    pub contact_info: Option<ContactInfo>,
}

/// Server-side state of an asynchronous generation job.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskStatus {
    Processing,
    Completed {
        file_path: String,
        exterior_image: Option<String>,
    },
    Failed {
        message: Option<String>,
    },
}

/// Client-side phase of one polled generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Submitted,
    Polling,
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

/// A brochure history row as stored by the account backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrochureRecord {
    pub id: Option<Uuid>,
    pub hotel_name: String,
    pub location: String,
    pub file_path: String,
    pub exterior_image: Option<String>,
    pub room_image: Option<String>,
    pub restaurant_image: Option<String>,
    pub prompt: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// The unsaved shape of a history row, built after a successful generation.
#[derive(Debug, Clone)]
pub struct NewBrochureRecord {
    pub hotel_name: String,
    pub location: String,
    pub file_path: String,
    pub exterior_image: Option<String>,
    pub room_image: Option<String>,
    pub restaurant_image: Option<String>,
    pub prompt: String,
}

/// Details needed to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Fields a user may change on their profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_parses_the_two_known_values() {
        assert_eq!("trifold".parse::<Layout>().unwrap(), Layout::Trifold);
        assert_eq!("full_bleed".parse::<Layout>().unwrap(), Layout::FullBleed);
    }

    #[test]
    fn layout_rejects_anything_else() {
        assert!("bifold".parse::<Layout>().is_err());
        assert!("FULL_BLEED".parse::<Layout>().is_err());
        assert!("".parse::<Layout>().is_err());
    }

    #[test]
    fn layout_round_trips_through_as_str() {
        for layout in [Layout::Trifold, Layout::FullBleed] {
            assert_eq!(layout.as_str().parse::<Layout>().unwrap(), layout);
        }
    }
}
