//! services/client/src/adapters/brochure_api.rs
//!
//! Adapter for the brochure generation service. Implements the
//! `BrochureGenerationService` port from the `core` crate.
//!
//! The two layouts answer in different wire shapes; each has its own
//! mapping function into the single normalized `GenerationResult`. A
//! response whose status is not the expected success value is a failure,
//! never a result.

use async_trait::async_trait;
use brochura_core::domain::{
    AssetRole, GenerationResult, Layout, TaskStatus, TrifoldOrder,
};
use brochura_core::ports::{BrochureGenerationService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::adapters::http::{decode_json, Backend};

/// Shown when the backend fails without a detail message of its own.
const GENERIC_FAILURE: &str = "Failed to generate brochure";

/// Absolute URL of a generated document under the brochure service.
pub fn brochure_url(base: &str, path: &str) -> String {
    format!("{}/brochures/{}", base, path)
}

/// Absolute URL of a generated image under the brochure service.
pub fn image_url(base: &str, path: &str) -> String {
    format!("{}/images/{}", base, path)
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct BrochureBackend {
    http: Backend,
}

impl BrochureBackend {
    pub fn new(http: Backend) -> Self {
        Self { http }
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct TrifoldOrderWire<'a> {
    hotel_name: &'a str,
    location: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    amenities: Option<Vec<AmenityWire<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    experience_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_info: Option<ContactWire<'a>>,
}

#[derive(Serialize)]
struct AmenityWire<'a> {
    title: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct ContactWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    website: Option<&'a str>,
}

#[derive(Serialize)]
struct PromptGenerationWire<'a> {
    prompt: &'a str,
    layout: &'a str,
}

#[derive(Serialize)]
struct JobSubmitWire<'a> {
    hotel_name: &'a str,
    location: &'a str,
    layout: &'a str,
}

#[derive(Deserialize)]
struct TrifoldResponseWire {
    status: String,
    message: Option<String>,
    files: Option<TrifoldFilesWire>,
    hotel_name: Option<String>,
    location: Option<String>,
}

#[derive(Deserialize)]
struct TrifoldFilesWire {
    pdf: String,
}

#[derive(Deserialize)]
struct FullBleedResponseWire {
    status: String,
    message: Option<String>,
    file_path: Option<String>,
    images: Option<FullBleedImagesWire>,
    hotel_name: Option<String>,
    location: Option<String>,
}

#[derive(Deserialize, Default)]
struct FullBleedImagesWire {
    exterior: Option<String>,
    room: Option<String>,
    restaurant: Option<String>,
}

#[derive(Deserialize)]
struct JobSubmittedWire {
    task_id: String,
}

#[derive(Deserialize)]
struct TaskStatusWire {
    status: String,
    message: Option<String>,
    #[serde(alias = "filePath")]
    file_path: Option<String>,
    #[serde(alias = "exteriorImage")]
    exterior_image: Option<String>,
}

//=========================================================================================
// Normalization (pure, per layout variant)
//=========================================================================================

fn normalize_trifold(base: &str, wire: TrifoldResponseWire) -> PortResult<GenerationResult> {
    if wire.status != "success" {
        return Err(PortError::Backend(
            wire.message.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        ));
    }
    let files = wire
        .files
        .ok_or_else(|| PortError::Backend(GENERIC_FAILURE.to_string()))?;

    Ok(GenerationResult {
        document_url: brochure_url(base, &files.pdf),
        asset_urls: BTreeMap::new(),
        hotel_name: wire.hotel_name,
        location: wire.location,
    })
}

fn normalize_full_bleed(base: &str, wire: FullBleedResponseWire) -> PortResult<GenerationResult> {
    if wire.status != "completed" {
        return Err(PortError::Backend(
            wire.message.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        ));
    }
    let file_path = wire
        .file_path
        .ok_or_else(|| PortError::Backend(GENERIC_FAILURE.to_string()))?;

    let images = wire.images.unwrap_or_default();
    let mut asset_urls = BTreeMap::new();
    for (role, path) in [
        (AssetRole::Exterior, images.exterior),
        (AssetRole::Room, images.room),
        (AssetRole::Restaurant, images.restaurant),
    ] {
        if let Some(path) = path {
            asset_urls.insert(role, image_url(base, &path));
        }
    }

    Ok(GenerationResult {
        document_url: brochure_url(base, &file_path),
        asset_urls,
        hotel_name: wire.hotel_name,
        location: wire.location,
    })
}

fn parse_task_status(wire: TaskStatusWire) -> PortResult<TaskStatus> {
    match wire.status.as_str() {
        "processing" => Ok(TaskStatus::Processing),
        "completed" => {
            let file_path = wire
                .file_path
                .ok_or_else(|| PortError::Backend(GENERIC_FAILURE.to_string()))?;
            Ok(TaskStatus::Completed {
                file_path,
                exterior_image: wire.exterior_image,
            })
        }
        "failed" => Ok(TaskStatus::Failed {
            message: wire.message,
        }),
        other => Err(PortError::Backend(format!(
            "unrecognized task status '{}'",
            other
        ))),
    }
}

//=========================================================================================
// `BrochureGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl BrochureGenerationService for BrochureBackend {
    async fn generate_trifold(&self, order: &TrifoldOrder) -> PortResult<GenerationResult> {
        let body = TrifoldOrderWire {
            hotel_name: &order.hotel_name,
            location: &order.location,
            amenities: order.amenities.as_ref().map(|amenities| {
                amenities
                    .iter()
                    .map(|a| AmenityWire {
                        title: &a.title,
                        description: &a.description,
                    })
                    .collect()
            }),
            experience_text: order.experience_text.as_deref(),
            contact_info: order.contact_info.as_ref().map(|c| ContactWire {
                phone: c.phone.as_deref(),
                email: c.email.as_deref(),
                website: c.website.as_deref(),
            }),
        };
        let response = self.http.post_json("/generate-trifold", &body).await?;
        let wire: TrifoldResponseWire = decode_json(response).await?;
        normalize_trifold(self.http.base_url(), wire)
    }

    async fn generate_from_prompt(
        &self,
        prompt: &str,
        layout: Layout,
    ) -> PortResult<GenerationResult> {
        let body = PromptGenerationWire {
            prompt,
            layout: layout.as_str(),
        };
        let response = self
            .http
            .post_json("/generate-brochure-from-prompt", &body)
            .await?;
        let wire: FullBleedResponseWire = decode_json(response).await?;
        normalize_full_bleed(self.http.base_url(), wire)
    }

    async fn submit_job(
        &self,
        hotel_name: &str,
        location: &str,
        layout: Layout,
    ) -> PortResult<String> {
        let body = JobSubmitWire {
            hotel_name,
            location,
            layout: layout.as_str(),
        };
        let response = self.http.post_json("/generate-brochure", &body).await?;
        let wire: JobSubmittedWire = decode_json(response).await?;
        debug!("Submitted generation job {}", wire.task_id);
        Ok(wire.task_id)
    }

    async fn job_status(&self, task_id: &str) -> PortResult<TaskStatus> {
        let response = self.http.get(&format!("/task-status/{}", task_id)).await?;
        let wire: TaskStatusWire = decode_json(response).await?;
        parse_task_status(wire)
    }

    async fn download(&self, url: &str) -> PortResult<Vec<u8>> {
        let response = self.http.get_absolute(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;
        if bytes.is_empty() {
            return Err(PortError::Backend("Downloaded file is empty".to_string()));
        }
        Ok(bytes.to_vec())
    }
}
