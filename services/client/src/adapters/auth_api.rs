//! services/client/src/adapters/auth_api.rs
//!
//! Adapter for the account backend's authentication and user-profile
//! endpoints. Implements the `AuthService` port from the `core` crate.
//!
//! Successful logins (password or OAuth exchange) persist the returned
//! session into the store, so this adapter is the single writer on the
//! login path; `clear` happens on logout and on token expiry.

use async_trait::async_trait;
use brochura_core::domain::{NewAccount, ProfileUpdate, Session, UserProfile};
use brochura_core::ports::{AuthService, PortError, PortResult, SessionStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::adapters::http::{decode_json, Backend};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct AuthBackend {
    http: Backend,
    session: Arc<dyn SessionStore>,
}

impl AuthBackend {
    pub fn new(http: Backend, session: Arc<dyn SessionStore>) -> Self {
        Self { http, session }
    }

    async fn exchange_for_session(&self, path: &str, body: &impl Serialize) -> PortResult<Session> {
        let response = self.http.post_json(path, body).await?;
        let wire: AuthResponseWire = decode_json(response).await?;
        let session = wire.into_session()?;
        self.session.store(&session)?;
        info!("Logged in as {}", session.user.email);
        Ok(session)
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct LoginWire<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignupWire<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    created_date: String,
}

#[derive(Serialize)]
struct GoogleWire<'a> {
    credential: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FacebookWire<'a> {
    access_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponseWire {
    access_token: Option<String>,
    user_id: i64,
    name: String,
    email: String,
    created_date: Option<String>,
}

impl AuthResponseWire {
    fn into_session(self) -> PortResult<Session> {
        let token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PortError::Unexpected("Invalid response format".to_string()))?;
        Ok(Session {
            token,
            user: UserProfile {
                id: self.user_id,
                name: self.name,
                email: self.email,
                created_date: parse_backend_date(self.created_date.as_deref()),
                last_login_date: Some(Utc::now()),
            },
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileWire {
    user_id: i64,
    name: String,
    email: String,
    created_date: Option<String>,
    last_login_date: Option<String>,
}

impl ProfileWire {
    fn into_domain(self) -> UserProfile {
        UserProfile {
            id: self.user_id,
            name: self.name,
            email: self.email,
            created_date: parse_backend_date(self.created_date.as_deref()),
            last_login_date: parse_backend_date(self.last_login_date.as_deref()),
        }
    }
}

#[derive(Serialize)]
struct ProfileUpdateWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

/// The account backend emits timestamps in RFC 3339; anything else reads as
/// "not provided" rather than failing the whole exchange.
fn parse_backend_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

//=========================================================================================
// `AuthService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthService for AuthBackend {
    async fn login(&self, email: &str, password: &str) -> PortResult<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(PortError::Validation(
                "email and password are required".to_string(),
            ));
        }
        self.exchange_for_session("/auth/login", &LoginWire { email, password })
            .await
    }

    async fn signup(&self, account: &NewAccount) -> PortResult<()> {
        if account.name.trim().is_empty()
            || account.email.trim().is_empty()
            || account.password.is_empty()
        {
            return Err(PortError::Validation(
                "name, email and password are required".to_string(),
            ));
        }
        let body = SignupWire {
            name: &account.name,
            email: &account.email,
            password: &account.password,
            created_date: Utc::now().to_rfc3339(),
        };
        self.http.post_json("/auth/signup", &body).await?;
        info!("Account created for {}", account.email);
        Ok(())
    }

    async fn login_with_google(&self, credential: &str) -> PortResult<Session> {
        if credential.is_empty() {
            return Err(PortError::Validation(
                "a Google credential is required".to_string(),
            ));
        }
        self.exchange_for_session("/auth/google", &GoogleWire { credential })
            .await
    }

    async fn login_with_facebook(&self, access_token: &str) -> PortResult<Session> {
        if access_token.is_empty() {
            return Err(PortError::Validation(
                "a Facebook access token is required".to_string(),
            ));
        }
        self.exchange_for_session("/auth/facebook", &FacebookWire { access_token })
            .await
    }

    async fn profile(&self) -> PortResult<UserProfile> {
        let response = self.http.get("/api/user/profile").await?;
        let wire: ProfileWire = decode_json(response).await?;
        Ok(wire.into_domain())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> PortResult<UserProfile> {
        let body = ProfileUpdateWire {
            name: update.name.as_deref(),
            email: update.email.as_deref(),
        };
        let response = self.http.put_json("/api/user/profile", &body).await?;
        let wire: ProfileWire = decode_json(response).await?;
        Ok(wire.into_domain())
    }
}
