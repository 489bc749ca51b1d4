//! Database operations for `creator_campaigns`.

use chrono::{DateTime, NaiveDate, Utc};
use creatordb_core::{CampaignStatus, Deliverable, PerformanceMetrics};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const CAMPAIGN_COLUMNS: &str = "id, public_id, creator_id, campaign_name, description, \
     brand_name, status, budget, currency, deliverables, performance_metrics, \
     start_date, end_date, created_at, updated_at";

/// A row from the `creator_campaigns` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CampaignRow {
    pub id: i64,
    pub public_id: Uuid,
    pub creator_id: i64,
    pub campaign_name: String,
    pub description: Option<String>,
    pub brand_name: String,
    pub status: String,
    /// `NUMERIC(10,2)`.
    pub budget: Option<Decimal>,
    pub currency: String,
    pub deliverables: Json<Vec<Deliverable>>,
    pub performance_metrics: Json<PerformanceMetrics>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCampaign<'a> {
    pub campaign_name: &'a str,
    pub description: Option<&'a str>,
    pub brand_name: &'a str,
    pub status: CampaignStatus,
    pub budget: Option<Decimal>,
    pub currency: &'a str,
    pub deliverables: &'a [Deliverable],
    pub performance_metrics: &'a PerformanceMetrics,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Inserts a campaign for `creator_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including the
/// `end_date >= start_date` CHECK.
pub async fn insert_campaign(
    pool: &PgPool,
    creator_id: i64,
    campaign: &NewCampaign<'_>,
) -> Result<CampaignRow, DbError> {
    let row = sqlx::query_as::<_, CampaignRow>(&format!(
        "INSERT INTO creator_campaigns \
             (public_id, creator_id, campaign_name, description, brand_name, status, budget, \
              currency, deliverables, performance_metrics, start_date, end_date) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING {CAMPAIGN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(creator_id)
    .bind(campaign.campaign_name)
    .bind(campaign.description)
    .bind(campaign.brand_name)
    .bind(campaign.status.as_str())
    .bind(campaign.budget)
    .bind(campaign.currency)
    .bind(Json(campaign.deliverables))
    .bind(Json(campaign.performance_metrics))
    .bind(campaign.start_date)
    .bind(campaign.end_date)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Campaigns of one creator, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_campaigns_for_creator(
    pool: &PgPool,
    creator_id: i64,
) -> Result<Vec<CampaignRow>, DbError> {
    let rows = sqlx::query_as::<_, CampaignRow>(&format!(
        "SELECT {CAMPAIGN_COLUMNS} FROM creator_campaigns \
         WHERE creator_id = $1 \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(creator_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
