mod campaigns;
mod creators;
mod portal;

use std::{str::FromStr, sync::Arc, time::Duration};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use creatordb_phyllo::PhylloError;
use creatordb_sync::{CreatorService, SyncError};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub service: Arc<CreatorService>,
}

/// Success envelope. The payload's fields sit next to `meta`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(flatten)]
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &creatordb_db::DbError) -> ApiError {
    if let creatordb_db::DbError::Sqlx(sqlx::Error::Database(db_err)) = error {
        if db_err.code().as_deref() == Some("23505") {
            return ApiError::new(request_id, "conflict", "a record with that value already exists");
        }
    }
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// Message shown to callers for a provider failure. API errors carry the
/// provider's own message.
fn upstream_message(error: &PhylloError) -> String {
    match error {
        PhylloError::Api { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

pub(super) fn map_sync_error(request_id: String, error: &SyncError) -> ApiError {
    match error {
        SyncError::NotFound(message) => ApiError::new(request_id, "not_found", message.as_str()),
        SyncError::Validation(message) => {
            ApiError::new(request_id, "validation_error", message.as_str())
        }
        SyncError::Upstream(e) => {
            tracing::error!(error = %e, "phyllo request failed");
            ApiError::new(request_id, "upstream_error", upstream_message(e))
        }
        SyncError::Db(e) => map_db_error(request_id, e),
    }
}

/// Unwraps a JSON body, turning any rejection into a `bad_request`.
pub(super) fn json_body<T>(
    request_id: &str,
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    body.map(|Json(inner)| inner)
        .map_err(|rejection| ApiError::new(request_id, "bad_request", rejection.body_text()))
}

/// A creator id that is not a UUID cannot name an existing creator.
pub(super) fn parse_creator_id(request_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::new(request_id, "not_found", format!("Creator {raw} not found")))
}

/// Parses an optional query value, rejecting anything that is not a `T`.
pub(super) fn parse_query_param<T: FromStr>(
    request_id: &str,
    name: &str,
    raw: Option<&str>,
) -> Result<Option<T>, ApiError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            ApiError::new(
                request_id,
                "bad_request",
                format!("query parameter '{name}' has an invalid value '{value}'"),
            )
        }),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn admin_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/admin/creators",
            get(creators::list_creators).post(creators::create_creator),
        )
        .route(
            "/admin/creators/{creator_id}",
            get(creators::get_creator).put(creators::update_creator),
        )
        .route(
            "/admin/creators/{creator_id}/sync",
            post(creators::sync_creator),
        )
        .route(
            "/admin/creators/{creator_id}/sync-runs",
            get(creators::list_sync_runs),
        )
        .route(
            "/admin/creators/{creator_id}/platforms/{account_id}",
            delete(creators::disconnect_platform),
        )
        .route(
            "/admin/creators/{creator_id}/campaigns",
            get(campaigns::list_campaigns).post(campaigns::create_campaign),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

fn store_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/store/creator-portal", post(portal::creator_portal))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(admin_router(auth, rate_limit.clone()))
        .merge(store_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    match creatordb_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::new(
                req_id.0,
                HealthData {
                    status: "ok",
                    database: "ok",
                },
            )),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::new(
                    req_id.0,
                    HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                )),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
