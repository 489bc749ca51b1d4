//! Database operations for `sync_runs`.
//!
//! A run is opened as `running` and closed exactly once as `succeeded`,
//! `partial` or `failed`. Closing a run that is no longer `running` is an
//! [`DbError::InvalidSyncRunTransition`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const SYNC_RUN_COLUMNS: &str = "id, public_id, creator_id, trigger_source, status, \
     accounts_synced, accounts_failed, error_message, started_at, completed_at";

/// What started a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Api,
    Scheduler,
    Cli,
}

impl TriggerSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerSource::Api => "api",
            TriggerSource::Scheduler => "scheduler",
            TriggerSource::Cli => "cli",
        }
    }
}

impl std::fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal status of a run that reached the per-account stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRunOutcome {
    Succeeded,
    Partial,
    Failed,
}

impl SyncRunOutcome {
    /// No failures is a success (including zero accounts); only failures is a
    /// failure; anything else is partial.
    #[must_use]
    pub fn from_counts(synced: usize, failed: usize) -> Self {
        match (synced, failed) {
            (_, 0) => SyncRunOutcome::Succeeded,
            (0, _) => SyncRunOutcome::Failed,
            _ => SyncRunOutcome::Partial,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SyncRunOutcome::Succeeded => "succeeded",
            SyncRunOutcome::Partial => "partial",
            SyncRunOutcome::Failed => "failed",
        }
    }
}

/// A row from the `sync_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub creator_id: i64,
    pub trigger_source: String,
    pub status: String,
    pub accounts_synced: i32,
    pub accounts_failed: i32,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Opens a run in `running` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_sync_run(
    pool: &PgPool,
    creator_id: i64,
    trigger: TriggerSource,
) -> Result<SyncRunRow, DbError> {
    let row = sqlx::query_as::<_, SyncRunRow>(&format!(
        "INSERT INTO sync_runs (public_id, creator_id, trigger_source, status) \
         VALUES ($1, $2, $3, 'running') \
         RETURNING {SYNC_RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(creator_id)
    .bind(trigger.as_str())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Closes a run with its per-account counts.
///
/// `error_message` summarises failed accounts, if any.
///
/// # Errors
///
/// Returns [`DbError::InvalidSyncRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_sync_run(
    pool: &PgPool,
    id: i64,
    outcome: SyncRunOutcome,
    accounts_synced: i32,
    accounts_failed: i32,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE sync_runs \
         SET status = $1, accounts_synced = $2, accounts_failed = $3, \
             error_message = $4, completed_at = NOW() \
         WHERE id = $5 AND status = 'running'",
    )
    .bind(outcome.as_str())
    .bind(accounts_synced)
    .bind(accounts_failed)
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidSyncRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run `failed` before any account was processed.
///
/// # Errors
///
/// Returns [`DbError::InvalidSyncRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_sync_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE sync_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidSyncRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_sync_run(pool: &PgPool, id: i64) -> Result<SyncRunRow, DbError> {
    sqlx::query_as::<_, SyncRunRow>(&format!(
        "SELECT {SYNC_RUN_COLUMNS} FROM sync_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// The most recent `limit` runs for a creator, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sync_runs_for_creator(
    pool: &PgPool,
    creator_id: i64,
    limit: i64,
) -> Result<Vec<SyncRunRow>, DbError> {
    let rows = sqlx::query_as::<_, SyncRunRow>(&format!(
        "SELECT {SYNC_RUN_COLUMNS} FROM sync_runs \
         WHERE creator_id = $1 \
         ORDER BY started_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(creator_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
