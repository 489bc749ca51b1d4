use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use creatordb_sync::{CampaignView, NewCampaignInput};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{json_body, map_sync_error, parse_creator_id, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CampaignsBody {
    campaigns: Vec<CampaignView>,
}

#[derive(Debug, Serialize)]
pub(super) struct CampaignBody {
    campaign: CampaignView,
}

/// GET /admin/creators/{creator_id}/campaigns
pub(super) async fn list_campaigns(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(creator_id): Path<String>,
) -> Result<Json<ApiResponse<CampaignsBody>>, ApiError> {
    let id = parse_creator_id(&req_id.0, &creator_id)?;
    let campaigns = state
        .service
        .list_campaigns(id)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, CampaignsBody { campaigns })))
}

/// POST /admin/creators/{creator_id}/campaigns
pub(super) async fn create_campaign(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(creator_id): Path<String>,
    body: Result<Json<NewCampaignInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CampaignBody>>), ApiError> {
    let id = parse_creator_id(&req_id.0, &creator_id)?;
    let input = json_body(&req_id.0, body)?;
    let campaign = state
        .service
        .create_campaign(id, input)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, CampaignBody { campaign })),
    ))
}
