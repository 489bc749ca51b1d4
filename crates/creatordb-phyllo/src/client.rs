//! HTTP client for the Phyllo REST API.
//!
//! Wraps `reqwest` with bearer-token management (see [`TokenSession`]) and
//! typed response deserialization. Every call is a single proxied request:
//! no retries and no response shaping beyond unwrapping the `data` envelope.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::{upstream_message, PhylloError};
use crate::session::TokenSession;
use crate::types::{
    ConnectedAccount, CreateUserRequest, DataEnvelope, EngagementPost, EngagementQuery, Identity,
    IncomeQuery, PhylloUser, SdkTokenRequest,
};

pub const DEFAULT_BASE_URL: &str = "https://api.getphyllo.com";

/// Client for the Phyllo REST API.
///
/// Use [`PhylloClient::new`] for the hosted API or
/// [`PhylloClient::with_base_url`] to point at a mock server in tests.
pub struct PhylloClient {
    client: Client,
    base_url: Url,
    token_url: Url,
    session: TokenSession,
}

impl std::fmt::Debug for PhylloClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhylloClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl PhylloClient {
    /// Creates a client pointed at the hosted Phyllo API.
    ///
    /// # Errors
    ///
    /// Returns [`PhylloError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        client_id: &str,
        client_secret: &str,
        timeout_secs: u64,
    ) -> Result<Self, PhylloError> {
        Self::with_base_url(client_id, client_secret, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`PhylloError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`PhylloError::InvalidBaseUrl`] if `base_url` is not
    /// an absolute http(s) URL.
    pub fn with_base_url(
        client_id: &str,
        client_secret: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PhylloError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("creatordb/0.1 (creator-sync)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed =
            Url::parse(&normalised).map_err(|_| PhylloError::InvalidBaseUrl(base_url.to_owned()))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(PhylloError::InvalidBaseUrl(base_url.to_owned()));
        }

        let token_url = join_segments(&parsed, &["v1", "token"]);

        Ok(Self {
            client,
            base_url: parsed,
            token_url,
            session: TokenSession::new(client_id, client_secret),
        })
    }

    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// See [`PhylloClient::with_base_url`].
    pub fn from_config(config: &creatordb_core::AppConfig) -> Result<Self, PhylloError> {
        Self::with_base_url(
            &config.phyllo_client_id,
            &config.phyllo_client_secret,
            config.phyllo_request_timeout_secs,
            &config.phyllo_base_url,
        )
    }

    #[must_use]
    pub fn session(&self) -> &TokenSession {
        &self.session
    }

    /// Registers a user with Phyllo (`POST /v1/users`).
    ///
    /// # Errors
    ///
    /// - [`PhylloError::Auth`] if no token could be obtained.
    /// - [`PhylloError::Api`] on a non-2xx response.
    /// - [`PhylloError::Http`] on network failure.
    /// - [`PhylloError::Deserialize`] if the response shape is unexpected.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        external_id: &str,
    ) -> Result<PhylloUser, PhylloError> {
        let url = self.endpoint(&["v1", "users"]);
        let body = CreateUserRequest {
            name,
            email,
            external_id,
        };
        self.request_json(self.client.post(url).json(&body), "createUser")
            .await
    }

    /// Fetches a user profile (`GET /v1/users/{id}`).
    ///
    /// # Errors
    ///
    /// Same as [`PhylloClient::create_user`].
    pub async fn get_user(&self, user_id: &str) -> Result<PhylloUser, PhylloError> {
        let url = self.endpoint(&["v1", "users", user_id]);
        self.request_json(self.client.get(url), "getUser").await
    }

    /// Lists the accounts a user has connected (`GET /v1/users/{id}/accounts`).
    ///
    /// # Errors
    ///
    /// Same as [`PhylloClient::create_user`].
    pub async fn get_connected_accounts(
        &self,
        user_id: &str,
    ) -> Result<Vec<ConnectedAccount>, PhylloError> {
        let url = self.endpoint(&["v1", "users", user_id, "accounts"]);
        let envelope: DataEnvelope<Vec<ConnectedAccount>> = self
            .request_json(self.client.get(url), "getConnectedAccounts")
            .await?;
        Ok(envelope.data)
    }

    /// Fetches profile data for an account (`GET /v1/accounts/{id}/identity`).
    ///
    /// # Errors
    ///
    /// Same as [`PhylloClient::create_user`].
    pub async fn get_identity(&self, account_id: &str) -> Result<Identity, PhylloError> {
        let url = self.endpoint(&["v1", "accounts", account_id, "identity"]);
        let envelope: DataEnvelope<Identity> = self
            .request_json(self.client.get(url), "getIdentityData")
            .await?;
        Ok(envelope.data)
    }

    /// Fetches the engagement window for an account
    /// (`GET /v1/accounts/{id}/engagement`).
    ///
    /// # Errors
    ///
    /// Same as [`PhylloClient::create_user`].
    pub async fn get_engagement(
        &self,
        account_id: &str,
        query: &EngagementQuery,
    ) -> Result<Vec<EngagementPost>, PhylloError> {
        let url = self.endpoint(&["v1", "accounts", account_id, "engagement"]);
        let envelope: DataEnvelope<Vec<EngagementPost>> = self
            .request_json(self.client.get(url).query(query), "getEngagementData")
            .await?;
        Ok(envelope.data)
    }

    /// Fetches income data for an account (`GET /v1/accounts/{id}/income`).
    ///
    /// The payload is returned undecoded.
    ///
    /// # Errors
    ///
    /// Same as [`PhylloClient::create_user`].
    pub async fn get_income(
        &self,
        account_id: &str,
        from_date: Option<&str>,
        to_date: Option<&str>,
    ) -> Result<serde_json::Value, PhylloError> {
        let url = self.endpoint(&["v1", "accounts", account_id, "income"]);
        let query = IncomeQuery { from_date, to_date };
        self.request_json(self.client.get(url).query(&query), "getIncomeData")
            .await
    }

    /// Fetches audience demographics (`GET /v1/accounts/{id}/audience`).
    ///
    /// Returns the `data` member when the body has one, otherwise the whole
    /// body.
    ///
    /// # Errors
    ///
    /// Same as [`PhylloClient::create_user`].
    pub async fn get_audience(&self, account_id: &str) -> Result<serde_json::Value, PhylloError> {
        let url = self.endpoint(&["v1", "accounts", account_id, "audience"]);
        let mut body: serde_json::Value = self
            .request_json(self.client.get(url), "getAudienceData")
            .await?;
        if let Some(data) = body.get_mut("data") {
            return Ok(data.take());
        }
        Ok(body)
    }

    /// Creates a short-lived token for the browser Connect SDK
    /// (`POST /v1/sdk/token`). The payload is passed through unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`PhylloClient::create_user`].
    pub async fn create_sdk_token(&self, user_id: &str) -> Result<serde_json::Value, PhylloError> {
        let url = self.endpoint(&["v1", "sdk", "token"]);
        let body = SdkTokenRequest { user_id };
        self.request_json(self.client.post(url).json(&body), "createSDKToken")
            .await
    }

    /// Disconnects an account (`DELETE /v1/accounts/{id}`).
    ///
    /// # Errors
    ///
    /// Same as [`PhylloClient::create_user`].
    pub async fn disconnect_account(
        &self,
        account_id: &str,
    ) -> Result<serde_json::Value, PhylloError> {
        let url = self.endpoint(&["v1", "accounts", account_id]);
        self.request_json(
            self.client.request(Method::DELETE, url),
            "disconnectAccount",
        )
        .await
    }

    /// Builds an endpoint URL below the base URL. Each segment is
    /// percent-encoded, so ids cannot escape their path position.
    fn endpoint(&self, segments: &[&str]) -> Url {
        join_segments(&self.base_url, segments)
    }

    /// Attaches the bearer token, sends the request, and decodes a 2xx body.
    ///
    /// A `401` drops the cached token, unless another caller already
    /// replaced it, before the error is returned. An
    /// empty 2xx body decodes as JSON `null`.
    async fn request_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, PhylloError> {
        let token = self.session.bearer(&self.client, &self.token_url).await?;
        let response = request.bearer_auth(&token).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            self.session.invalidate(&token).await;
        }

        if !status.is_success() {
            let message = upstream_message(&body);
            tracing::warn!(op = context, status = status.as_u16(), %message, "phyllo request failed");
            return Err(PhylloError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = if body.trim().is_empty() { "null" } else { &body };
        serde_json::from_str(text).map_err(|e| PhylloError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
