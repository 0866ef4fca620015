//! services/client/src/adapters/http.rs
//!
//! Shared HTTP plumbing for every backend adapter: one `reqwest` client,
//! bearer-token injection from the session store, and uniform classification
//! of failed exchanges.
//!
//! The expired-token rule is global: any 401/403 carrying the backend's
//! "Expired JWT token" message clears the persisted session before the error
//! is surfaced, whichever adapter made the call.

use brochura_core::ports::{PortError, PortResult, SessionStore};
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

/// The message the account backend attaches to a rejected, expired token.
const EXPIRED_TOKEN_MESSAGE: &str = "Expired JWT token";

/// A handle on one backend: base URL plus the shared client and session.
#[derive(Clone)]
pub struct Backend {
    client: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl Backend {
    pub fn new(client: reqwest::Client, base_url: String, session: Arc<dyn SessionStore>) -> Self {
        Self {
            client,
            base_url,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> PortResult<Response> {
        self.execute(self.client.get(self.url(path))).await
    }

    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> PortResult<Response> {
        self.execute(self.client.get(self.url(path)).query(query))
            .await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> PortResult<Response> {
        self.execute(self.client.post(self.url(path)).json(body))
            .await
    }

    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> PortResult<Response> {
        self.execute(self.client.put(self.url(path)).json(body))
            .await
    }

    /// GET of an already-absolute URL (static brochure/image files).
    pub async fn get_absolute(&self, url: &str) -> PortResult<Response> {
        self.execute(self.client.get(url)).await
    }

    /// Sends one request with the bearer token attached, and maps every
    /// failure into the port taxonomy.
    async fn execute(&self, request: RequestBuilder) -> PortResult<Response> {
        let request = match self.session.current() {
            Some(session) => request.header(AUTHORIZATION, format!("Bearer {}", session.token)),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match classify_failure(status, &body) {
            Failure::ExpiredToken => {
                warn!("Backend rejected the bearer token as expired; clearing session");
                if let Err(e) = self.session.clear() {
                    error!("Failed to clear expired session: {}", e);
                }
                Err(PortError::AuthExpired)
            }
            Failure::Backend(detail) => Err(PortError::Backend(detail)),
        }
    }
}

/// Decodes a JSON response body, mapping decode failures into the port error.
pub async fn decode_json<T: DeserializeOwned>(response: Response) -> PortResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| PortError::Network(format!("malformed response body: {}", e)))
}

#[derive(Debug, PartialEq)]
pub(crate) enum Failure {
    ExpiredToken,
    Backend(String),
}

/// Error bodies come in two dialects: `{"detail": ...}` from the generation
/// services and `{"message": ...}` from the account backend.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

pub(crate) fn classify_failure(status: StatusCode, body: &str) -> Failure {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail.or(b.message));

    let auth_status =
        status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN;
    if auth_status && detail.as_deref() == Some(EXPIRED_TOKEN_MESSAGE) {
        return Failure::ExpiredToken;
    }

    Failure::Backend(detail.unwrap_or_else(|| format!("Request failed with status {}", status)))
}
