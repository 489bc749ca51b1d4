//! Client-credentials token session for the Phyllo API.

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Url};
use tokio::sync::Mutex;

use crate::error::{upstream_message, PhylloError};
use crate::types::{TokenRequest, TokenResponse};

/// A bearer token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    /// `None` when the token endpoint did not report a lifetime.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// Owns the client credentials and the cached access token.
///
/// The token is acquired on first use, refreshed once it has expired, and
/// can be dropped with [`TokenSession::invalidate`]. The cache lock is held
/// for the whole exchange, so callers racing on an expired token wait for a
/// single refresh instead of each performing one.
pub struct TokenSession {
    client_id: String,
    client_secret: String,
    token: Mutex<Option<AccessToken>>,
}

impl std::fmt::Debug for TokenSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSession")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl TokenSession {
    #[must_use]
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            token: Mutex::new(None),
        }
    }

    /// Returns a valid bearer token, exchanging credentials when needed.
    ///
    /// # Errors
    ///
    /// Returns [`PhylloError::Auth`] if the token exchange fails.
    pub async fn bearer(&self, http: &Client, token_url: &Url) -> Result<String, PhylloError> {
        let mut slot = self.token.lock().await;
        if let Some(token) = slot.as_ref() {
            if !token.is_expired_at(Utc::now()) {
                return Ok(token.value.clone());
            }
            tracing::debug!("phyllo access token expired; refreshing");
        }

        let fresh = self.exchange(http, token_url).await?;
        let value = fresh.value.clone();
        *slot = Some(fresh);
        Ok(value)
    }

    /// Drops the cached token if it is still `rejected`, so the next call
    /// re-authenticates. A token refreshed since `rejected` was handed out
    /// is kept. Returns whether the cache was cleared.
    pub async fn invalidate(&self, rejected: &str) -> bool {
        let mut slot = self.token.lock().await;
        if slot.as_ref().is_some_and(|t| t.value == rejected) {
            slot.take();
            return true;
        }
        false
    }

    /// The currently cached token, if any.
    pub async fn current(&self) -> Option<AccessToken> {
        self.token.lock().await.clone()
    }

    async fn exchange(&self, http: &Client, token_url: &Url) -> Result<AccessToken, PhylloError> {
        let request = TokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            grant_type: "client_credentials",
        };

        let response = http
            .post(token_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| auth_error(&e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| auth_error(&e.to_string()))?;

        if !status.is_success() {
            return Err(auth_error(&format!(
                "status {}: {}",
                status.as_u16(),
                upstream_message(&body)
            )));
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| auth_error(&format!("token parse error: {e}")))?;

        tracing::info!(expires_in = ?parsed.expires_in, "acquired phyllo access token");

        Ok(AccessToken {
            value: parsed.access_token,
            expires_at: parsed
                .expires_in
                .and_then(Duration::try_seconds)
                .map(|lifetime| Utc::now() + lifetime),
        })
    }
}

fn auth_error(detail: &str) -> PhylloError {
    PhylloError::Auth(format!("Failed to authenticate with Phyllo: {detail}"))
}
