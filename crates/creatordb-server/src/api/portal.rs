//! Storefront creator portal: hands out Connect SDK tokens.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{json_body, map_sync_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct PortalRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct PortalBody {
    sdk_token: serde_json::Value,
}

/// POST /store/creator-portal
pub(super) async fn creator_portal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<PortalRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PortalBody>>, ApiError> {
    let rid = &req_id.0;
    let user_id = json_body(rid, body)?
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::new(rid, "bad_request", "user_id is required"))?;

    let sdk_token = state
        .service
        .create_sdk_token(&user_id)
        .await
        .map_err(|e| map_sync_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, PortalBody { sdk_token })))
}
