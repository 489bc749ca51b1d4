//! Admin creator handlers: search, register, detail, verification, sync.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use creatordb_sync::{
    CreatorSearch, CreatorView, NewCreatorInput, SearchPage, SyncError, SyncReport, SyncRunView,
    TriggerSource,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    json_body, map_sync_error, parse_creator_id, parse_query_param, ApiError, ApiResponse,
    AppState,
};

const DEFAULT_SYNC_RUN_LIMIT: i64 = 20;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Numbers arrive as strings so a malformed value becomes a `bad_request`
/// with the parameter named.
#[derive(Debug, Default, Deserialize)]
pub(super) struct CreatorListQuery {
    pub platform: Option<String>,
    pub min_followers: Option<String>,
    pub max_followers: Option<String>,
    pub engagement_rate: Option<String>,
    pub location: Option<String>,
    pub verification_status: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl CreatorListQuery {
    fn into_search(self, rid: &str) -> Result<CreatorSearch, ApiError> {
        Ok(CreatorSearch {
            min_followers: parse_query_param(rid, "min_followers", self.min_followers.as_deref())?,
            max_followers: parse_query_param(rid, "max_followers", self.max_followers.as_deref())?,
            min_engagement_rate: parse_query_param(
                rid,
                "engagement_rate",
                self.engagement_rate.as_deref(),
            )?,
            limit: parse_query_param(rid, "limit", self.limit.as_deref())?,
            offset: parse_query_param(rid, "offset", self.offset.as_deref())?,
            platform: non_blank(self.platform),
            location: non_blank(self.location),
            verification_status: non_blank(self.verification_status),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateCreatorRequest {
    pub verification_status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SyncRunQuery {
    pub limit: Option<String>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct CreatorBody {
    creator: CreatorView,
}

#[derive(Debug, Serialize)]
pub(super) struct SyncBody {
    message: String,
    run_id: uuid::Uuid,
    creator: CreatorView,
    report: SyncReport,
}

#[derive(Debug, Serialize)]
pub(super) struct SyncRunsBody {
    sync_runs: Vec<SyncRunView>,
}

fn sync_message(report: &SyncReport) -> String {
    let mut message = format!("Synced {} account(s)", report.synced.len());
    if !report.failed.is_empty() {
        message.push_str(&format!(", {} failed", report.failed.len()));
    }
    if !report.skipped.is_empty() {
        message.push_str(&format!(", {} skipped", report.skipped.len()));
    }
    message
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /admin/creators
pub(super) async fn list_creators(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CreatorListQuery>,
) -> Result<Json<ApiResponse<SearchPage>>, ApiError> {
    let search = query.into_search(&req_id.0)?;
    let page = state
        .service
        .search_creators(&search)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, page)))
}

/// POST /admin/creators
///
/// A provider rejection is the caller's problem here (duplicate or
/// malformed registration), so it surfaces as a 400.
pub(super) async fn create_creator(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<NewCreatorInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CreatorBody>>), ApiError> {
    let input = json_body(&req_id.0, body)?;
    let creator = state
        .service
        .create_creator(input)
        .await
        .map_err(|e| match e {
            SyncError::Upstream(ref upstream) => {
                tracing::warn!(error = %upstream, "phyllo rejected creator registration");
                ApiError::new(req_id.0.clone(), "bad_request", super::upstream_message(upstream))
            }
            other => map_sync_error(req_id.0.clone(), &other),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, CreatorBody { creator })),
    ))
}

/// GET /admin/creators/{creator_id}
pub(super) async fn get_creator(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(creator_id): Path<String>,
) -> Result<Json<ApiResponse<CreatorBody>>, ApiError> {
    let id = parse_creator_id(&req_id.0, &creator_id)?;
    let creator = state
        .service
        .get_creator(id)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, CreatorBody { creator })))
}

/// PUT /admin/creators/{creator_id}
pub(super) async fn update_creator(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(creator_id): Path<String>,
    body: Result<Json<UpdateCreatorRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CreatorBody>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_creator_id(rid, &creator_id)?;
    let request = json_body(rid, body)?;
    let status = request
        .verification_status
        .ok_or_else(|| ApiError::new(rid, "validation_error", "verification_status is required"))?;

    let creator = state
        .service
        .update_verification_status(id, &status)
        .await
        .map_err(|e| map_sync_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, CreatorBody { creator })))
}

/// POST /admin/creators/{creator_id}/sync
pub(super) async fn sync_creator(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(creator_id): Path<String>,
) -> Result<Json<ApiResponse<SyncBody>>, ApiError> {
    let id = parse_creator_id(&req_id.0, &creator_id)?;
    let outcome = state
        .service
        .sync_creator_platforms(id, TriggerSource::Api)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        SyncBody {
            message: sync_message(&outcome.report),
            run_id: outcome.run_id,
            creator: outcome.creator,
            report: outcome.report,
        },
    )))
}

/// GET /admin/creators/{creator_id}/sync-runs
pub(super) async fn list_sync_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(creator_id): Path<String>,
    Query(query): Query<SyncRunQuery>,
) -> Result<Json<ApiResponse<SyncRunsBody>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_creator_id(rid, &creator_id)?;
    let limit = parse_query_param::<i64>(rid, "limit", query.limit.as_deref())?
        .unwrap_or(DEFAULT_SYNC_RUN_LIMIT)
        .clamp(1, creatordb_sync::MAX_PAGE_LIMIT);

    let sync_runs = state
        .service
        .list_sync_runs(id, limit)
        .await
        .map_err(|e| map_sync_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, SyncRunsBody { sync_runs })))
}

/// DELETE /admin/creators/{creator_id}/platforms/{account_id}
pub(super) async fn disconnect_platform(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((creator_id, account_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<CreatorBody>>, ApiError> {
    let id = parse_creator_id(&req_id.0, &creator_id)?;
    let creator = state
        .service
        .disconnect_platform(id, &account_id)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, CreatorBody { creator })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use creatordb_sync::{FailedAccount, SkippedAccount, SyncedAccount};

    #[test]
    fn list_query_parses_numbers_and_drops_blanks() {
        let query = CreatorListQuery {
            platform: Some("  ".to_string()),
            min_followers: Some("1000".to_string()),
            engagement_rate: Some("2.5".to_string()),
            limit: Some("10".to_string()),
            ..CreatorListQuery::default()
        };
        let search = query.into_search("req").expect("valid query");
        assert_eq!(search.platform, None);
        assert_eq!(search.min_followers, Some(1000));
        assert_eq!(search.min_engagement_rate, Some(2.5));
        assert_eq!(search.limit, Some(10));
        assert_eq!(search.offset, None);
    }

    #[test]
    fn list_query_rejects_non_numeric_followers() {
        let query = CreatorListQuery {
            max_followers: Some("lots".to_string()),
            ..CreatorListQuery::default()
        };
        let err = query.into_search("req").expect_err("should reject");
        assert_eq!(err.error.code, "bad_request");
        assert!(err.error.message.contains("max_followers"));
    }

    #[test]
    fn sync_message_mentions_failures_and_skips() {
        let report = SyncReport {
            synced: vec![SyncedAccount {
                account_id: "a".to_string(),
                platform: "YouTube".to_string(),
                followers_count: 10,
                engagement_rate: 1.0,
            }],
            failed: vec![FailedAccount {
                account_id: "b".to_string(),
                platform: "TikTok".to_string(),
                reason: "boom".to_string(),
            }],
            skipped: vec![SkippedAccount {
                account_id: "c".to_string(),
                platform: "Twitter".to_string(),
            }],
        };
        assert_eq!(
            sync_message(&report),
            "Synced 1 account(s), 1 failed, 1 skipped"
        );
        assert_eq!(sync_message(&SyncReport::default()), "Synced 0 account(s)");
    }
}
