//! crates/brochura_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! orchestration code to be independent of the concrete HTTP backends.

use async_trait::async_trait;

use crate::domain::{
    BrochureRecord, GenerationResult, Layout, NewAccount, NewBrochureRecord, ParsedPromptInfo,
    ProfileUpdate, Session, TaskStatus, TrifoldOrder, UserProfile,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the external backends.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The request was rejected locally, before any network call.
    #[error("Invalid request: {0}")]
    Validation(String),
    /// The backend could not be reached or the exchange failed in transit.
    #[error("Network error: {0}")]
    Network(String),
    /// The backend answered with a non-success status; carries its detail
    /// text when one was provided.
    #[error("{0}")]
    Backend(String),
    /// The stored bearer token was rejected as expired. The session has
    /// already been cleared when this is returned.
    #[error("Session expired")]
    AuthExpired,
    /// A polled job exceeded its attempt budget.
    #[error("Timed out: {0}")]
    Timeout(String),
    /// The flow was pre-empted by a newer submission.
    #[error("Cancelled")]
    Cancelled,
    /// A catch-all for anything else.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> PortResult<Session>;

    async fn signup(&self, account: &NewAccount) -> PortResult<()>;

    /// Exchanges a Google identity credential for a session.
    async fn login_with_google(&self, credential: &str) -> PortResult<Session>;

    /// Exchanges a Facebook access token for a session.
    async fn login_with_facebook(&self, access_token: &str) -> PortResult<Session>;

    async fn profile(&self) -> PortResult<UserProfile>;

    async fn update_profile(&self, update: &ProfileUpdate) -> PortResult<UserProfile>;
}

/// The primary, NLP-backed prompt parsing path. The heuristic fallback is
/// applied by the caller, not behind this port.
#[async_trait]
pub trait PromptParsingService: Send + Sync {
    async fn parse(&self, prompt: &str) -> PortResult<ParsedPromptInfo>;
}

#[async_trait]
pub trait BrochureGenerationService: Send + Sync {
    /// Single-exchange trifold generation.
    async fn generate_trifold(&self, order: &TrifoldOrder) -> PortResult<GenerationResult>;

    /// Single-exchange full-bleed generation from a free-text prompt.
    async fn generate_from_prompt(
        &self,
        prompt: &str,
        layout: Layout,
    ) -> PortResult<GenerationResult>;

    /// Submits an asynchronous generation job; returns the opaque task id.
    async fn submit_job(
        &self,
        hotel_name: &str,
        location: &str,
        layout: Layout,
    ) -> PortResult<String>;

    async fn job_status(&self, task_id: &str) -> PortResult<TaskStatus>;

    /// Fetches a generated document. Rejects empty bodies.
    async fn download(&self, url: &str) -> PortResult<Vec<u8>>;
}

#[async_trait]
pub trait HistoryService: Send + Sync {
    async fn save(&self, record: &NewBrochureRecord) -> PortResult<()>;

    /// Most recent first. Asset paths in the returned records are absolute.
    async fn recent(&self, limit: Option<u32>) -> PortResult<Vec<BrochureRecord>>;
}

/// Process-wide persisted session state. All mutation goes through `store`
/// and `clear`; every outgoing request reads `current`.
pub trait SessionStore: Send + Sync {
    fn current(&self) -> Option<Session>;

    fn store(&self, session: &Session) -> PortResult<()>;

    fn clear(&self) -> PortResult<()>;
}
