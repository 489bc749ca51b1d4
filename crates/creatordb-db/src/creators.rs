//! Database operations for the `creators` table.

use chrono::{DateTime, Utc};
use creatordb_core::{ContactInfo, Preferences, VerificationStatus};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const CREATOR_COLUMNS: &str = "c.id, c.public_id, c.phyllo_user_id, c.external_id, c.name, \
     c.email, c.bio, c.location, c.profile_picture_url, c.contact_info, c.preferences, \
     c.verification_status, c.created_at, c.updated_at";

/// Filter clause shared by [`search_creators`] and [`count_creators`].
///
/// `$1` status, `$2` location pattern, `$3` platform, `$4` min followers,
/// `$5` max followers, `$6` min engagement rate. Platform predicates are
/// evaluated together against a single active platform row.
const SEARCH_PREDICATE: &str = "($1::TEXT IS NULL OR c.verification_status = $1) \
     AND ($2::TEXT IS NULL OR c.location ILIKE $2) \
     AND (($3::TEXT IS NULL AND $4::BIGINT IS NULL AND $5::BIGINT IS NULL \
           AND $6::FLOAT8 IS NULL) \
          OR EXISTS ( \
              SELECT 1 FROM creator_platforms p \
              WHERE p.creator_id = c.id \
                AND p.is_active \
                AND ($3::TEXT IS NULL OR p.platform_name = $3) \
                AND ($4::BIGINT IS NULL OR p.followers_count >= $4) \
                AND ($5::BIGINT IS NULL OR p.followers_count <= $5) \
                AND ($6::FLOAT8 IS NULL OR p.engagement_rate >= $6)))";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `creators` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreatorRow {
    pub id: i64,
    pub public_id: Uuid,
    pub phyllo_user_id: String,
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub profile_picture_url: Option<String>,
    pub contact_info: Json<ContactInfo>,
    pub preferences: Json<Preferences>,
    /// Constrained by a CHECK to the [`VerificationStatus`] values.
    pub verification_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreatorRow {
    /// Parsed verification status. Falls back to `pending` only if the
    /// column somehow holds a value outside the CHECK constraint.
    #[must_use]
    pub fn status(&self) -> VerificationStatus {
        self.verification_status
            .parse()
            .unwrap_or(VerificationStatus::Pending)
    }
}

/// Values for a new creator row. Status always starts as `pending`.
#[derive(Debug, Clone)]
pub struct NewCreator<'a> {
    pub phyllo_user_id: &'a str,
    pub external_id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub bio: Option<&'a str>,
    pub location: Option<&'a str>,
    pub profile_picture_url: Option<&'a str>,
    pub contact_info: &'a ContactInfo,
    pub preferences: &'a Preferences,
}

/// Search criteria. Every `None` field is a no-op.
#[derive(Debug, Clone, Default)]
pub struct CreatorFilter {
    pub platform: Option<String>,
    pub min_followers: Option<i64>,
    pub max_followers: Option<i64>,
    pub min_engagement_rate: Option<f64>,
    /// Case-insensitive substring of `location`.
    pub location: Option<String>,
    pub verification_status: Option<VerificationStatus>,
}

impl CreatorFilter {
    fn location_pattern(&self) -> Option<String> {
        self.location
            .as_deref()
            .map(|needle| format!("%{}%", escape_like(needle)))
    }
}

/// Escapes `ILIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Inserts a creator in `pending` status with a freshly generated `public_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including unique violations
/// on `phyllo_user_id` or `external_id`.
pub async fn insert_creator(pool: &PgPool, creator: &NewCreator<'_>) -> Result<CreatorRow, DbError> {
    let row = sqlx::query_as::<_, CreatorRow>(&format!(
        "INSERT INTO creators AS c \
             (public_id, phyllo_user_id, external_id, name, email, bio, location, \
              profile_picture_url, contact_info, preferences, verification_status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending') \
         RETURNING {CREATOR_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(creator.phyllo_user_id)
    .bind(creator.external_id)
    .bind(creator.name)
    .bind(creator.email)
    .bind(creator.bio)
    .bind(creator.location)
    .bind(creator.profile_picture_url)
    .bind(Json(creator.contact_info))
    .bind(Json(creator.preferences))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetches a creator by its public UUID.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_creator_by_public_id(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Option<CreatorRow>, DbError> {
    let row = sqlx::query_as::<_, CreatorRow>(&format!(
        "SELECT {CREATOR_COLUMNS} FROM creators c WHERE c.public_id = $1"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Sets `verification_status` and bumps `updated_at`. Never inserts.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no creator has `public_id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_verification_status(
    pool: &PgPool,
    public_id: Uuid,
    status: VerificationStatus,
) -> Result<CreatorRow, DbError> {
    sqlx::query_as::<_, CreatorRow>(&format!(
        "UPDATE creators AS c \
         SET verification_status = $1, updated_at = NOW() \
         WHERE c.public_id = $2 \
         RETURNING {CREATOR_COLUMNS}"
    ))
    .bind(status.as_str())
    .bind(public_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns one page of creators matching `filter`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn search_creators(
    pool: &PgPool,
    filter: &CreatorFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<CreatorRow>, DbError> {
    let rows = sqlx::query_as::<_, CreatorRow>(&format!(
        "SELECT {CREATOR_COLUMNS} FROM creators c \
         WHERE {SEARCH_PREDICATE} \
         ORDER BY c.created_at DESC, c.id DESC \
         LIMIT $7 OFFSET $8"
    ))
    .bind(filter.verification_status.map(VerificationStatus::as_str))
    .bind(filter.location_pattern())
    .bind(filter.platform.as_deref())
    .bind(filter.min_followers)
    .bind(filter.max_followers)
    .bind(filter.min_engagement_rate)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Counts every creator matching `filter`, ignoring paging.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_creators(pool: &PgPool, filter: &CreatorFilter) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM creators c WHERE {SEARCH_PREDICATE}"
    ))
    .bind(filter.verification_status.map(VerificationStatus::as_str))
    .bind(filter.location_pattern())
    .bind(filter.platform.as_deref())
    .bind(filter.min_followers)
    .bind(filter.max_followers)
    .bind(filter.min_engagement_rate)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Every creator's public id, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_creator_public_ids(pool: &PgPool) -> Result<Vec<Uuid>, DbError> {
    let ids = sqlx::query_scalar::<_, Uuid>("SELECT public_id FROM creators ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(ids)
}
