//! Inputs and API-facing views produced by [`crate::CreatorService`].

use chrono::{DateTime, NaiveDate, Utc};
use creatordb_core::{
    format_compact, ContactInfo, CreatorTotals, Deliverable, PerformanceMetrics, PlatformMetrics,
    Preferences, RosterStats, VerificationStatus,
};
use creatordb_db::{CampaignRow, CreatorRow, PlatformRow, SyncRunRow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::SyncError;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Registration payload for a new creator.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCreatorInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub contact_info: ContactInfo,
    #[serde(default)]
    pub preferences: Preferences,
}

impl NewCreatorInput {
    pub(crate) fn validate(&self) -> Result<(), SyncError> {
        if self.name.trim().is_empty() {
            return Err(SyncError::Validation("name is required".to_string()));
        }
        let email = self.email.trim();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid_email {
            return Err(SyncError::Validation(format!(
                "email '{}' is not a valid address",
                self.email
            )));
        }
        Ok(())
    }
}

/// Search criteria as received from a caller. `verification_status` is
/// validated by the service.
#[derive(Debug, Clone, Default)]
pub struct CreatorSearch {
    pub platform: Option<String>,
    pub min_followers: Option<i64>,
    pub max_followers: Option<i64>,
    pub min_engagement_rate: Option<f64>,
    pub location: Option<String>,
    pub verification_status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Clamps `limit` to `1..=MAX_PAGE_LIMIT` (default [`DEFAULT_PAGE_LIMIT`])
/// and floors `offset` at 0.
#[must_use]
pub fn normalize_paging(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        offset.unwrap_or(0).max(0),
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCampaignInput {
    pub campaign_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub brand_name: String,
    /// Defaults to `draft`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub budget: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,
    #[serde(default)]
    pub performance_metrics: PerformanceMetrics,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PlatformView {
    pub id: Uuid,
    pub external_account_id: String,
    pub platform_name: String,
    pub platform_username: String,
    pub platform_url: Option<String>,
    pub metrics: PlatformMetrics,
    pub audience_demographics: Option<serde_json::Value>,
    pub is_active: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlatformRow> for PlatformView {
    fn from(row: PlatformRow) -> Self {
        let metrics = row.metrics();
        Self {
            id: row.public_id,
            external_account_id: row.external_account_id,
            platform_name: row.platform_name,
            platform_username: row.platform_username,
            platform_url: row.platform_url,
            metrics,
            audience_demographics: row.audience_demographics,
            is_active: row.is_active,
            last_synced_at: row.last_synced_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignView {
    pub id: Uuid,
    pub campaign_name: String,
    pub description: Option<String>,
    pub brand_name: String,
    pub status: String,
    pub budget: Option<Decimal>,
    pub currency: String,
    pub deliverables: Vec<Deliverable>,
    pub performance_metrics: PerformanceMetrics,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CampaignRow> for CampaignView {
    fn from(row: CampaignRow) -> Self {
        Self {
            id: row.public_id,
            campaign_name: row.campaign_name,
            description: row.description,
            brand_name: row.brand_name,
            status: row.status,
            budget: row.budget,
            currency: row.currency,
            deliverables: row.deliverables.0,
            performance_metrics: row.performance_metrics.0,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A creator with its platforms and, on detail reads, its campaigns.
///
/// `totals` aggregates over active platforms only.
#[derive(Debug, Clone, Serialize)]
pub struct CreatorView {
    pub id: Uuid,
    pub phyllo_user_id: String,
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub profile_picture_url: Option<String>,
    pub contact_info: ContactInfo,
    pub preferences: Preferences,
    pub verification_status: VerificationStatus,
    pub platforms: Vec<PlatformView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaigns: Option<Vec<CampaignView>>,
    pub totals: CreatorTotals,
    pub total_followers_display: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreatorView {
    #[must_use]
    pub fn from_rows(
        row: CreatorRow,
        platforms: Vec<PlatformRow>,
        campaigns: Option<Vec<CampaignRow>>,
    ) -> Self {
        let active: Vec<PlatformMetrics> = platforms
            .iter()
            .filter(|p| p.is_active)
            .map(PlatformRow::metrics)
            .collect();
        let totals = CreatorTotals::from_platforms(&active);
        let verification_status = row.status();

        Self {
            id: row.public_id,
            phyllo_user_id: row.phyllo_user_id,
            external_id: row.external_id,
            name: row.name,
            email: row.email,
            bio: row.bio,
            location: row.location,
            profile_picture_url: row.profile_picture_url,
            contact_info: row.contact_info.0,
            preferences: row.preferences.0,
            verification_status,
            platforms: platforms.into_iter().map(PlatformView::from).collect(),
            campaigns: campaigns.map(|c| c.into_iter().map(CampaignView::from).collect()),
            total_followers_display: format_compact(totals.total_followers),
            totals,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncRunView {
    pub id: Uuid,
    pub trigger_source: String,
    pub status: String,
    pub accounts_synced: i32,
    pub accounts_failed: i32,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<SyncRunRow> for SyncRunView {
    fn from(row: SyncRunRow) -> Self {
        Self {
            id: row.public_id,
            trigger_source: row.trigger_source,
            status: row.status,
            accounts_synced: row.accounts_synced,
            accounts_failed: row.accounts_failed,
            error_message: row.error_message,
            started_at: row.started_at,
            completed_at: row.completed_at,
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub creators: Vec<CreatorView>,
    /// Total matches ignoring `limit`/`offset`.
    pub count: i64,
    pub offset: i64,
    pub limit: i64,
    pub stats: RosterStats,
}

// ---------------------------------------------------------------------------
// Sync reporting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncedAccount {
    pub account_id: String,
    pub platform: String,
    pub followers_count: i64,
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAccount {
    pub account_id: String,
    pub platform: String,
    pub reason: String,
}

/// An account on a platform outside `PHYLLO_ENABLED_PLATFORMS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAccount {
    pub account_id: String,
    pub platform: String,
}

/// Per-account result of one sync.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub synced: Vec<SyncedAccount>,
    pub failed: Vec<FailedAccount>,
    pub skipped: Vec<SkippedAccount>,
}

impl SyncReport {
    /// `account: reason` pairs joined with `; `, or `None` without failures.
    #[must_use]
    pub fn failure_summary(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        Some(
            self.failed
                .iter()
                .map(|f| format!("{}: {}", f.account_id, f.reason))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub run_id: Uuid,
    pub creator: CreatorView,
    pub report: SyncReport,
}

/// Result of syncing one creator during a bulk run.
#[derive(Debug, Clone, Serialize)]
pub struct BulkSyncEntry {
    pub creator_id: Uuid,
    pub synced: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Set when the whole creator sync failed.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkSyncSummary {
    pub entries: Vec<BulkSyncEntry>,
}

impl BulkSyncSummary {
    #[must_use]
    pub fn failed_creators(&self) -> usize {
        self.entries.iter().filter(|e| e.error.is_some()).count()
    }

    #[must_use]
    pub fn succeeded_creators(&self) -> usize {
        self.entries.len() - self.failed_creators()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str) -> NewCreatorInput {
        serde_json::from_value(serde_json::json!({"name": name, "email": email}))
            .expect("input should deserialize")
    }

    #[test]
    fn paging_defaults_and_clamps() {
        assert_eq!(normalize_paging(None, None), (20, 0));
        assert_eq!(normalize_paging(Some(0), Some(-5)), (1, 0));
        assert_eq!(normalize_paging(Some(1_000), Some(40)), (200, 40));
    }

    #[test]
    fn creator_input_requires_name_and_email() {
        assert!(input("Jane", "jane@example.com").validate().is_ok());
        assert!(matches!(
            input("  ", "jane@example.com").validate(),
            Err(SyncError::Validation(_))
        ));
        assert!(input("Jane", "jane.example.com").validate().is_err());
        assert!(input("Jane", "@example.com").validate().is_err());
    }

    #[test]
    fn creator_input_defaults_optional_json() {
        let parsed = input("Jane", "jane@example.com");
        assert_eq!(parsed.contact_info, ContactInfo::default());
        assert!(parsed.preferences.collaboration_types.is_empty());
    }

    #[test]
    fn failure_summary_joins_accounts() {
        let report = SyncReport {
            failed: vec![
                FailedAccount {
                    account_id: "a".to_string(),
                    platform: "instagram".to_string(),
                    reason: "timeout".to_string(),
                },
                FailedAccount {
                    account_id: "b".to_string(),
                    platform: "youtube".to_string(),
                    reason: "Phyllo API error (500): boom".to_string(),
                },
            ],
            ..SyncReport::default()
        };
        assert_eq!(
            report.failure_summary().as_deref(),
            Some("a: timeout; b: Phyllo API error (500): boom")
        );
        assert!(SyncReport::default().failure_summary().is_none());
    }

    #[test]
    fn bulk_summary_counts() {
        let entry = |error: Option<&str>| BulkSyncEntry {
            creator_id: Uuid::new_v4(),
            synced: 1,
            failed: 0,
            skipped: 0,
            error: error.map(str::to_string),
        };
        let summary = BulkSyncSummary {
            entries: vec![entry(None), entry(Some("boom")), entry(None)],
        };
        assert_eq!(summary.succeeded_creators(), 2);
        assert_eq!(summary.failed_creators(), 1);
    }
}
