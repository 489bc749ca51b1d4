//! Phyllo API request and response types.
//!
//! Only the fields the sync path reads are typed; everything else in a
//! payload is ignored. List endpoints wrap results in `{"data": [...]}`,
//! single-object endpoints in `{"data": {...}}`.

use creatordb_core::PostStats;
use serde::{Deserialize, Serialize};

/// `{"data": T}` envelope used by most Phyllo endpoints.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds. Tokens without one are treated as non-expiring.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct CreateUserRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub external_id: &'a str,
}

/// A user registered with Phyllo.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PhylloUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SdkTokenRequest<'a> {
    pub user_id: &'a str,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// A social account the user linked through Phyllo Connect.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectedAccount {
    pub id: String,
    /// Platform name as reported by Phyllo, e.g. `"instagram"`.
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Profile data for one connected account.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Identity {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub follower_count: i64,
    #[serde(default)]
    pub following_count: i64,
}

/// One post in an engagement window.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngagementPost {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(flatten)]
    pub stats: PostStats,
}

/// Optional window/paging parameters for the engagement endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngagementQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct IncomeQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<&'a str>,
}
