// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase client: GoTrue for auth, PostgREST for rows.
//!
//! Handles:
//! - Password sign-in and sign-up
//! - Current-user lookup and sign-out
//! - Profile reads and inserts, booking reads

use super::events::{AuthEvent, AuthEvents, AuthSubscription};
use super::{tables, SessionStore, SessionStoreFactory, SignUpOutcome, StoreError};
use crate::models::{Booking, Identity, NewProfile, Profile};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

/// Shared Supabase project client (one per process).
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Create a client for a project URL and its public anon key.
    pub fn new(base_url: &str, anon_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Start a request with the project key and the given bearer token.
    ///
    /// PostgREST falls back to the anon role when the bearer is the anon key.
    fn request(
        &self,
        method: reqwest::Method,
        url: &str,
        access_token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(&self.anon_key))
    }
}

impl SessionStoreFactory for SupabaseClient {
    fn open_session(&self) -> Arc<dyn SessionStore> {
        Arc::new(SupabaseSession::new(self.clone()))
    }
}

/// Tokens for a signed-in session.
///
/// Only the access token is kept. Once it expires GoTrue answers 401, the
/// identity check reads as signed out and the visitor signs in again.
#[derive(Debug, Clone, Deserialize)]
struct SessionTokens {
    access_token: String,
}

/// GoTrue session response (sign-in, and sign-up with auto-confirm).
#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(flatten)]
    tokens: SessionTokens,
    user: Identity,
}

/// One visitor's Supabase session.
pub struct SupabaseSession {
    client: SupabaseClient,
    tokens: RwLock<Option<SessionTokens>>,
    events: AuthEvents,
}

impl SupabaseSession {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            client,
            tokens: RwLock::new(None),
            events: AuthEvents::new(),
        }
    }

    fn access_token(&self) -> Option<String> {
        self.tokens.read().as_ref().map(|t| t.access_token.clone())
    }

    fn start_session(&self, session: SessionResponse) -> Identity {
        *self.tokens.write() = Some(session.tokens);
        self.events
            .emit(AuthEvent::SignedIn(Some(session.user.clone())));
        session.user
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;
        check_response(response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl SessionStore for SupabaseSession {
    async fn current_identity(&self) -> Result<Option<Identity>, StoreError> {
        let Some(token) = self.access_token() else {
            return Ok(None);
        };

        let request = self
            .client
            .request(reqwest::Method::GET, &self.client.auth_url("user"), Some(&token));

        match self.send_json::<Identity>(request).await {
            Ok(identity) => Ok(Some(identity)),
            Err(StoreError::NotAuthenticated) => {
                tracing::debug!("Access token rejected, treating session as signed out");
                *self.tokens.write() = None;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, StoreError> {
        let request = self
            .client
            .request(
                reqwest::Method::POST,
                &self.client.auth_url("token"),
                None,
            )
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }));

        let session = match self.send_json::<SessionResponse>(request).await {
            // GoTrue answers bad credentials with 400 invalid_grant
            Err(StoreError::Api { status: 400, .. }) => return Err(StoreError::InvalidCredentials),
            other => other?,
        };

        let identity = self.start_session(session);
        tracing::info!(user_id = %identity.id, "Signed in with password");
        Ok(identity)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome, StoreError> {
        let request = self
            .client
            .request(
                reqwest::Method::POST,
                &self.client.auth_url("signup"),
                None,
            )
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }));

        let body: serde_json::Value = self.send_json(request).await?;

        // With auto-confirm on, GoTrue returns a full session; otherwise a bare user
        if body.get("access_token").is_some() {
            let session: SessionResponse = serde_json::from_value(body)
                .map_err(|e| StoreError::Decode(format!("Sign-up session: {}", e)))?;
            let identity = self.start_session(session);
            tracing::info!(user_id = %identity.id, "Signed up and signed in");
            Ok(SignUpOutcome::SignedIn(identity))
        } else {
            tracing::info!("Signed up, email confirmation pending");
            Ok(SignUpOutcome::ConfirmationRequired)
        }
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        if let Some(token) = self.access_token() {
            let request = self.client.request(
                reqwest::Method::POST,
                &self.client.auth_url("logout"),
                Some(&token),
            );

            match self.send(request).await {
                Ok(_) => {}
                // Token already revoked or expired: the session is gone either way
                Err(StoreError::NotAuthenticated) | Err(StoreError::Api { status: 404, .. }) => {
                    tracing::debug!("Sign-out for an already-invalid session");
                }
                Err(e) => return Err(e),
            }
        }

        *self.tokens.write() = None;
        self.events.emit(AuthEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        self.events.subscribe()
    }

    fn last_event_seq(&self) -> u64 {
        self.events.last_seq()
    }

    async fn fetch_profile(&self, id: &str) -> Result<Option<Profile>, StoreError> {
        let token = self.access_token();
        let id_filter = format!("eq.{}", id);
        let request = self
            .client
            .request(
                reqwest::Method::GET,
                &self.client.rest_url(tables::PROFILES),
                token.as_deref(),
            )
            .query(&[("id", id_filter.as_str()), ("select", "*"), ("limit", "1")]);

        let rows: Vec<Profile> = self.send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_profile(&self, row: &NewProfile) -> Result<Profile, StoreError> {
        let token = self.access_token();
        let request = self
            .client
            .request(
                reqwest::Method::POST,
                &self.client.rest_url(tables::PROFILES),
                token.as_deref(),
            )
            .header("Prefer", "return=representation")
            .json(&[row]);

        let rows: Vec<Profile> = self.send_json(request).await?;
        let profile = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("Insert returned no rows".to_string()))?;

        tracing::info!(user_id = %profile.id, "Profile created");
        Ok(profile)
    }

    async fn fetch_bookings(&self, user_id: &str) -> Result<Vec<Booking>, StoreError> {
        let token = self.access_token();
        let user_filter = format!("eq.{}", user_id);
        let request = self
            .client
            .request(
                reqwest::Method::GET,
                &self.client.rest_url(tables::BOOKINGS),
                token.as_deref(),
            )
            .query(&[("user_id", user_filter.as_str()), ("select", "*")]);

        self.send_json(request).await
    }
}

/// Check response status and map failures to store errors.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    match status.as_u16() {
        401 | 403 => Err(StoreError::NotAuthenticated),
        409 => Err(StoreError::Conflict),
        code => Err(StoreError::Api {
            status: code,
            message: error_message(&body),
        }),
    }
}

/// Pull the human-readable message out of a GoTrue/PostgREST error body.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(|m| m.as_str()))
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
