//! Database operations for `creator_platforms`.

use chrono::{DateTime, Utc};
use creatordb_core::PlatformMetrics;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const PLATFORM_COLUMNS: &str = "id, public_id, creator_id, platform_name, external_account_id, \
     platform_username, platform_url, followers_count, following_count, posts_count, \
     engagement_rate, avg_likes, avg_comments, avg_shares, total_views, \
     audience_demographics, is_active, last_synced_at, created_at, updated_at";

/// A row from the `creator_platforms` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlatformRow {
    pub id: i64,
    pub public_id: Uuid,
    pub creator_id: i64,
    pub platform_name: String,
    pub external_account_id: String,
    pub platform_username: String,
    pub platform_url: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub posts_count: i64,
    pub engagement_rate: f64,
    pub avg_likes: i64,
    pub avg_comments: i64,
    pub avg_shares: i64,
    pub total_views: i64,
    pub audience_demographics: Option<serde_json::Value>,
    pub is_active: bool,
    /// `NULL` until the first successful sync of this account.
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlatformRow {
    #[must_use]
    pub fn metrics(&self) -> PlatformMetrics {
        PlatformMetrics {
            followers_count: self.followers_count,
            following_count: self.following_count,
            posts_count: self.posts_count,
            engagement_rate: self.engagement_rate,
            avg_likes: self.avg_likes,
            avg_comments: self.avg_comments,
            avg_shares: self.avg_shares,
            total_views: self.total_views,
        }
    }
}

/// Everything one successful account sync writes.
#[derive(Debug, Clone)]
pub struct PlatformSnapshot<'a> {
    pub platform_name: &'a str,
    pub external_account_id: &'a str,
    pub platform_username: &'a str,
    pub platform_url: Option<&'a str>,
    pub metrics: PlatformMetrics,
    pub audience_demographics: Option<&'a serde_json::Value>,
}

/// Inserts or fully overwrites the snapshot for one connected account.
///
/// Conflicts on `(creator_id, external_account_id)` replace every metric
/// column and the audience payload, reactivate the row and set
/// `last_synced_at = NOW()`. The row keeps its `id` and `public_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_platform_snapshot(
    pool: &PgPool,
    creator_id: i64,
    snapshot: &PlatformSnapshot<'_>,
) -> Result<PlatformRow, DbError> {
    let m = &snapshot.metrics;
    let row = sqlx::query_as::<_, PlatformRow>(&format!(
        "INSERT INTO creator_platforms \
             (public_id, creator_id, platform_name, external_account_id, platform_username, \
              platform_url, followers_count, following_count, posts_count, engagement_rate, \
              avg_likes, avg_comments, avg_shares, total_views, audience_demographics, \
              is_active, last_synced_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                 TRUE, NOW()) \
         ON CONFLICT (creator_id, external_account_id) DO UPDATE SET \
             platform_name         = EXCLUDED.platform_name, \
             platform_username     = EXCLUDED.platform_username, \
             platform_url          = EXCLUDED.platform_url, \
             followers_count       = EXCLUDED.followers_count, \
             following_count       = EXCLUDED.following_count, \
             posts_count           = EXCLUDED.posts_count, \
             engagement_rate       = EXCLUDED.engagement_rate, \
             avg_likes             = EXCLUDED.avg_likes, \
             avg_comments          = EXCLUDED.avg_comments, \
             avg_shares            = EXCLUDED.avg_shares, \
             total_views           = EXCLUDED.total_views, \
             audience_demographics = EXCLUDED.audience_demographics, \
             is_active             = TRUE, \
             last_synced_at        = NOW(), \
             updated_at            = NOW() \
         RETURNING {PLATFORM_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(creator_id)
    .bind(snapshot.platform_name)
    .bind(snapshot.external_account_id)
    .bind(snapshot.platform_username)
    .bind(snapshot.platform_url)
    .bind(m.followers_count)
    .bind(m.following_count)
    .bind(m.posts_count)
    .bind(m.engagement_rate)
    .bind(m.avg_likes)
    .bind(m.avg_comments)
    .bind(m.avg_shares)
    .bind(m.total_views)
    .bind(snapshot.audience_demographics)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetches the platform row for one connected account of a creator.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_platform(
    pool: &PgPool,
    creator_id: i64,
    external_account_id: &str,
) -> Result<Option<PlatformRow>, DbError> {
    let row = sqlx::query_as::<_, PlatformRow>(&format!(
        "SELECT {PLATFORM_COLUMNS} FROM creator_platforms \
         WHERE creator_id = $1 AND external_account_id = $2"
    ))
    .bind(creator_id)
    .bind(external_account_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// All platform rows of one creator, ordered by platform name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_platforms_for_creator(
    pool: &PgPool,
    creator_id: i64,
) -> Result<Vec<PlatformRow>, DbError> {
    let rows = sqlx::query_as::<_, PlatformRow>(&format!(
        "SELECT {PLATFORM_COLUMNS} FROM creator_platforms \
         WHERE creator_id = $1 \
         ORDER BY platform_name, id"
    ))
    .bind(creator_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Platform rows for a page of creators in one round trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_platforms_for_creators(
    pool: &PgPool,
    creator_ids: &[i64],
) -> Result<Vec<PlatformRow>, DbError> {
    if creator_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, PlatformRow>(&format!(
        "SELECT {PLATFORM_COLUMNS} FROM creator_platforms \
         WHERE creator_id = ANY($1) \
         ORDER BY creator_id, platform_name, id"
    ))
    .bind(creator_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Marks a connected account inactive. Metrics are left as last synced.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the creator has no such account, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn deactivate_platform(
    pool: &PgPool,
    creator_id: i64,
    external_account_id: &str,
) -> Result<PlatformRow, DbError> {
    sqlx::query_as::<_, PlatformRow>(&format!(
        "UPDATE creator_platforms \
         SET is_active = FALSE, updated_at = NOW() \
         WHERE creator_id = $1 AND external_account_id = $2 \
         RETURNING {PLATFORM_COLUMNS}"
    ))
    .bind(creator_id)
    .bind(external_account_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
