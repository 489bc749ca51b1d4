//! Creator aggregation: registration, metric sync, verification and search.

use std::collections::HashMap;
use std::sync::Arc;

use creatordb_core::{
    compute_platform_metrics, new_external_id, AppConfig, CampaignStatus, PostStats, RosterStats,
    VerificationStatus,
};
use creatordb_db::{
    CreatorFilter, CreatorRow, NewCampaign, NewCreator, PlatformRow, PlatformSnapshot,
    SyncRunOutcome, TriggerSource,
};
use creatordb_phyllo::{ConnectedAccount, EngagementQuery, PhylloClient};
use futures::stream::{self, StreamExt};
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::{
    normalize_paging, BulkSyncEntry, BulkSyncSummary, CampaignView, CreatorSearch, CreatorView,
    FailedAccount, NewCampaignInput, NewCreatorInput, SearchPage, SkippedAccount, SyncOutcome,
    SyncReport, SyncRunView, SyncedAccount,
};
use crate::SyncError;

const DEFAULT_CURRENCY: &str = "USD";

/// Knobs for the per-account sync loop.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Accounts synced in parallel. `1` processes accounts in provider order.
    pub account_concurrency: usize,
    /// Lowercase platform names to sync. `None` syncs every platform.
    pub enabled_platforms: Option<Vec<String>>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            account_concurrency: 1,
            enabled_platforms: None,
        }
    }
}

impl SyncSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            account_concurrency: config.sync_concurrency.max(1),
            enabled_platforms: Some(config.phyllo_enabled_platforms.clone()),
        }
    }

    fn is_enabled(&self, platform: &str) -> bool {
        let platform = platform.to_lowercase();
        self.enabled_platforms
            .as_ref()
            .is_none_or(|enabled| enabled.iter().any(|p| *p == platform))
    }
}

/// Owns the pool and provider client; every public operation is one
/// creator-level use case.
#[derive(Debug, Clone)]
pub struct CreatorService {
    pool: PgPool,
    phyllo: Arc<PhylloClient>,
    settings: SyncSettings,
}

impl CreatorService {
    #[must_use]
    pub fn new(pool: PgPool, phyllo: Arc<PhylloClient>, settings: SyncSettings) -> Self {
        Self {
            pool,
            phyllo,
            settings,
        }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Registers the creator with Phyllo, then stores it locally as `pending`.
    ///
    /// Nothing is written if validation or the provider call fails.
    ///
    /// # Errors
    ///
    /// [`SyncError::Validation`] for a blank name or malformed email,
    /// [`SyncError::Upstream`] if registration fails, [`SyncError::Db`] if
    /// the insert fails.
    pub async fn create_creator(&self, input: NewCreatorInput) -> Result<CreatorView, SyncError> {
        input.validate()?;

        let external_id = new_external_id();
        let user = self
            .phyllo
            .create_user(input.name.trim(), input.email.trim(), &external_id)
            .await?;

        let row = creatordb_db::insert_creator(
            &self.pool,
            &NewCreator {
                phyllo_user_id: &user.id,
                external_id: &external_id,
                name: input.name.trim(),
                email: input.email.trim(),
                bio: input.bio.as_deref(),
                location: input.location.as_deref(),
                profile_picture_url: input.profile_picture_url.as_deref(),
                contact_info: &input.contact_info,
                preferences: &input.preferences,
            },
        )
        .await?;

        tracing::info!(
            creator_id = %row.public_id,
            phyllo_user_id = %row.phyllo_user_id,
            "creator registered"
        );
        Ok(CreatorView::from_rows(row, Vec::new(), Some(Vec::new())))
    }

    /// Creator with platforms and campaigns.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotFound`] if no creator has `public_id`.
    pub async fn get_creator(&self, public_id: Uuid) -> Result<CreatorView, SyncError> {
        let row = self.load_creator(public_id).await?;
        self.creator_detail(row).await
    }

    /// Pulls every connected account from Phyllo and overwrites its snapshot.
    ///
    /// A failure on one account is recorded in the report and does not stop
    /// the others. The sync is recorded in `sync_runs`.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotFound`] for an unknown creator, [`SyncError::Upstream`]
    /// if the account list cannot be fetched, [`SyncError::Db`] if the run
    /// cannot be recorded.
    pub async fn sync_creator_platforms(
        &self,
        public_id: Uuid,
        trigger: TriggerSource,
    ) -> Result<SyncOutcome, SyncError> {
        let creator = self.load_creator(public_id).await?;
        let run = creatordb_db::create_sync_run(&self.pool, creator.id, trigger).await?;

        let accounts = match self
            .phyllo
            .get_connected_accounts(&creator.phyllo_user_id)
            .await
        {
            Ok(accounts) => accounts,
            Err(e) => {
                tracing::error!(creator_id = %public_id, error = %e, "failed to list connected accounts");
                if let Err(db_err) =
                    creatordb_db::fail_sync_run(&self.pool, run.id, &e.to_string()).await
                {
                    tracing::warn!(run_id = run.id, error = %db_err, "could not close failed sync run");
                }
                return Err(SyncError::Upstream(e));
            }
        };

        let mut report = SyncReport::default();
        let mut enabled = Vec::with_capacity(accounts.len());
        for account in accounts {
            if self.settings.is_enabled(&account.platform) {
                enabled.push(account);
            } else {
                tracing::debug!(account_id = %account.id, platform = %account.platform, "platform not enabled; skipping");
                report.skipped.push(SkippedAccount {
                    account_id: account.id,
                    platform: account.platform,
                });
            }
        }

        let creator_id = creator.id;
        let results: Vec<(ConnectedAccount, Result<PlatformRow, SyncError>)> =
            stream::iter(enabled)
                .map(|account| async move {
                    let result = self.sync_account(creator_id, &account).await;
                    (account, result)
                })
                .buffered(self.settings.account_concurrency.max(1))
                .collect()
                .await;

        for (account, result) in results {
            match result {
                Ok(row) => report.synced.push(SyncedAccount {
                    account_id: account.id,
                    platform: row.platform_name,
                    followers_count: row.followers_count,
                    engagement_rate: row.engagement_rate,
                }),
                Err(e) => {
                    tracing::warn!(
                        creator_id = %public_id,
                        account_id = %account.id,
                        error = %e,
                        "account sync failed"
                    );
                    report.failed.push(FailedAccount {
                        account_id: account.id,
                        platform: account.platform,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let outcome = SyncRunOutcome::from_counts(report.synced.len(), report.failed.len());
        if let Err(e) = creatordb_db::complete_sync_run(
            &self.pool,
            run.id,
            outcome,
            count_i32(report.synced.len()),
            count_i32(report.failed.len()),
            report.failure_summary().as_deref(),
        )
        .await
        {
            tracing::error!(run_id = run.id, error = %e, "could not complete sync run");
            let message = format!("could not record sync outcome: {e}");
            if let Err(db_err) = creatordb_db::fail_sync_run(&self.pool, run.id, &message).await {
                tracing::warn!(run_id = run.id, error = %db_err, "could not close failed sync run");
            }
            return Err(e.into());
        }

        tracing::info!(
            creator_id = %public_id,
            status = outcome.as_str(),
            synced = report.synced.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "creator sync finished"
        );

        Ok(SyncOutcome {
            run_id: run.public_id,
            creator: self.creator_detail(creator).await?,
            report,
        })
    }

    /// Fetches identity, engagement and audience concurrently and writes the
    /// snapshot only once all three succeeded.
    async fn sync_account(
        &self,
        creator_id: i64,
        account: &ConnectedAccount,
    ) -> Result<PlatformRow, SyncError> {
        let engagement_query = EngagementQuery::default();
        let (identity, posts, audience) = tokio::try_join!(
            self.phyllo.get_identity(&account.id),
            self.phyllo.get_engagement(&account.id, &engagement_query),
            self.phyllo.get_audience(&account.id),
        )?;

        let stats: Vec<PostStats> = posts.iter().map(|p| p.stats).collect();
        let metrics =
            compute_platform_metrics(identity.follower_count, identity.following_count, &stats);

        let username = if identity.username.is_empty() {
            account.username.as_deref().unwrap_or_default()
        } else {
            identity.username.as_str()
        };
        let audience = (!audience.is_null()).then_some(&audience);

        let row = creatordb_db::upsert_platform_snapshot(
            &self.pool,
            creator_id,
            &PlatformSnapshot {
                platform_name: &account.platform,
                external_account_id: &account.id,
                platform_username: username,
                platform_url: identity.url.as_deref(),
                metrics,
                audience_demographics: audience,
            },
        )
        .await?;

        Ok(row)
    }

    /// Sets the verification status. Never creates a creator.
    ///
    /// # Errors
    ///
    /// [`SyncError::Validation`] if `raw_status` is not one of the four
    /// statuses, [`SyncError::NotFound`] for an unknown creator.
    pub async fn update_verification_status(
        &self,
        public_id: Uuid,
        raw_status: &str,
    ) -> Result<CreatorView, SyncError> {
        let status = parse_verification_status(raw_status)?;
        let row = creatordb_db::update_verification_status(&self.pool, public_id, status)
            .await
            .map_err(|e| match e {
                creatordb_db::DbError::NotFound => SyncError::creator_not_found(public_id),
                other => other.into(),
            })?;

        tracing::info!(creator_id = %public_id, status = %status, "verification status updated");
        self.creator_detail(row).await
    }

    /// One page of creators matching every supplied criterion.
    ///
    /// # Errors
    ///
    /// [`SyncError::Validation`] for an unknown verification status,
    /// [`SyncError::Db`] if a query fails.
    pub async fn search_creators(&self, search: &CreatorSearch) -> Result<SearchPage, SyncError> {
        let filter = CreatorFilter {
            platform: search.platform.clone(),
            min_followers: search.min_followers,
            max_followers: search.max_followers,
            min_engagement_rate: search.min_engagement_rate,
            location: search.location.clone(),
            verification_status: search
                .verification_status
                .as_deref()
                .map(parse_verification_status)
                .transpose()?,
        };
        let (limit, offset) = normalize_paging(search.limit, search.offset);

        let rows = creatordb_db::search_creators(&self.pool, &filter, limit, offset).await?;
        let count = creatordb_db::count_creators(&self.pool, &filter).await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut by_creator: HashMap<i64, Vec<PlatformRow>> = HashMap::new();
        for platform in creatordb_db::list_platforms_for_creators(&self.pool, &ids).await? {
            by_creator.entry(platform.creator_id).or_default().push(platform);
        }

        let creators: Vec<CreatorView> = rows
            .into_iter()
            .map(|row| {
                let platforms = by_creator.remove(&row.id).unwrap_or_default();
                CreatorView::from_rows(row, platforms, None)
            })
            .collect();
        let stats = RosterStats::from_page(
            count,
            creators.iter().map(|c| (c.verification_status, &c.totals)),
        );

        Ok(SearchPage {
            creators,
            count,
            offset,
            limit,
            stats,
        })
    }

    /// Disconnects an account at Phyllo and marks the local row inactive.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotFound`] if the creator or account is unknown,
    /// [`SyncError::Upstream`] if the provider call fails.
    pub async fn disconnect_platform(
        &self,
        public_id: Uuid,
        account_id: &str,
    ) -> Result<CreatorView, SyncError> {
        let creator = self.load_creator(public_id).await?;
        if creatordb_db::get_platform(&self.pool, creator.id, account_id)
            .await?
            .is_none()
        {
            return Err(SyncError::NotFound(format!(
                "Account {account_id} is not linked to creator {public_id}"
            )));
        }

        self.phyllo.disconnect_account(account_id).await?;
        creatordb_db::deactivate_platform(&self.pool, creator.id, account_id).await?;

        tracing::info!(creator_id = %public_id, account_id, "platform disconnected");
        self.creator_detail(creator).await
    }

    /// Syncs every creator in turn. Individual failures are logged and
    /// reported, never propagated.
    ///
    /// # Errors
    ///
    /// [`SyncError::Db`] only if the creator list cannot be read.
    pub async fn sync_all_creators(
        &self,
        trigger: TriggerSource,
    ) -> Result<BulkSyncSummary, SyncError> {
        let ids = creatordb_db::list_creator_public_ids(&self.pool).await?;
        tracing::info!(creators = ids.len(), trigger = %trigger, "starting bulk creator sync");

        let mut summary = BulkSyncSummary::default();
        for creator_id in ids {
            let entry = match self.sync_creator_platforms(creator_id, trigger).await {
                Ok(outcome) => BulkSyncEntry {
                    creator_id,
                    synced: outcome.report.synced.len(),
                    failed: outcome.report.failed.len(),
                    skipped: outcome.report.skipped.len(),
                    error: None,
                },
                Err(e) => {
                    tracing::error!(creator_id = %creator_id, error = %e, "creator sync failed");
                    BulkSyncEntry {
                        creator_id,
                        synced: 0,
                        failed: 0,
                        skipped: 0,
                        error: Some(e.to_string()),
                    }
                }
            };
            summary.entries.push(entry);
        }

        tracing::info!(
            succeeded = summary.succeeded_creators(),
            failed = summary.failed_creators(),
            "bulk creator sync finished"
        );
        Ok(summary)
    }

    /// Mints a Connect SDK token for the creator portal.
    ///
    /// # Errors
    ///
    /// [`SyncError::Validation`] for a blank `user_id`,
    /// [`SyncError::Upstream`] if the provider call fails.
    pub async fn create_sdk_token(&self, user_id: &str) -> Result<serde_json::Value, SyncError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(SyncError::Validation("user_id is required".to_string()));
        }
        Ok(self.phyllo.create_sdk_token(user_id).await?)
    }

    /// The most recent sync runs of a creator, newest first.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotFound`] for an unknown creator.
    pub async fn list_sync_runs(
        &self,
        public_id: Uuid,
        limit: i64,
    ) -> Result<Vec<SyncRunView>, SyncError> {
        let creator = self.load_creator(public_id).await?;
        let rows =
            creatordb_db::list_sync_runs_for_creator(&self.pool, creator.id, limit.max(1)).await?;
        Ok(rows.into_iter().map(SyncRunView::from).collect())
    }

    /// Adds a campaign to a creator.
    ///
    /// # Errors
    ///
    /// [`SyncError::Validation`] for missing names, an unknown status, a
    /// negative budget or an end date before the start date;
    /// [`SyncError::NotFound`] for an unknown creator.
    pub async fn create_campaign(
        &self,
        public_id: Uuid,
        input: NewCampaignInput,
    ) -> Result<CampaignView, SyncError> {
        let status = validate_campaign(&input)?;
        let creator = self.load_creator(public_id).await?;

        let row = creatordb_db::insert_campaign(
            &self.pool,
            creator.id,
            &NewCampaign {
                campaign_name: input.campaign_name.trim(),
                description: input.description.as_deref(),
                brand_name: input.brand_name.trim(),
                status,
                budget: input.budget,
                currency: input.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
                deliverables: &input.deliverables,
                performance_metrics: &input.performance_metrics,
                start_date: input.start_date,
                end_date: input.end_date,
            },
        )
        .await?;

        tracing::info!(creator_id = %public_id, campaign_id = %row.public_id, "campaign created");
        Ok(CampaignView::from(row))
    }

    /// Campaigns of a creator, newest first.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotFound`] for an unknown creator.
    pub async fn list_campaigns(&self, public_id: Uuid) -> Result<Vec<CampaignView>, SyncError> {
        let creator = self.load_creator(public_id).await?;
        let rows = creatordb_db::list_campaigns_for_creator(&self.pool, creator.id).await?;
        Ok(rows.into_iter().map(CampaignView::from).collect())
    }

    async fn load_creator(&self, public_id: Uuid) -> Result<CreatorRow, SyncError> {
        creatordb_db::get_creator_by_public_id(&self.pool, public_id)
            .await?
            .ok_or_else(|| SyncError::creator_not_found(public_id))
    }

    async fn creator_detail(&self, row: CreatorRow) -> Result<CreatorView, SyncError> {
        let platforms = creatordb_db::list_platforms_for_creator(&self.pool, row.id).await?;
        let campaigns = creatordb_db::list_campaigns_for_creator(&self.pool, row.id).await?;
        Ok(CreatorView::from_rows(row, platforms, Some(campaigns)))
    }
}

fn parse_verification_status(raw: &str) -> Result<VerificationStatus, SyncError> {
    raw.parse::<VerificationStatus>().map_err(|_| {
        let allowed: Vec<&str> = VerificationStatus::ALL
            .iter()
            .map(|s| s.as_str())
            .collect();
        SyncError::Validation(format!(
            "invalid verification_status '{raw}'; expected one of: {}",
            allowed.join(", ")
        ))
    })
}

fn validate_campaign(input: &NewCampaignInput) -> Result<CampaignStatus, SyncError> {
    if input.campaign_name.trim().is_empty() {
        return Err(SyncError::Validation("campaign_name is required".to_string()));
    }
    if input.brand_name.trim().is_empty() {
        return Err(SyncError::Validation("brand_name is required".to_string()));
    }
    if input.budget.is_some_and(|b| b.is_sign_negative()) {
        return Err(SyncError::Validation("budget must not be negative".to_string()));
    }
    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if end < start {
            return Err(SyncError::Validation(
                "end_date must not be before start_date".to_string(),
            ));
        }
    }
    match input.status.as_deref() {
        None => Ok(CampaignStatus::Draft),
        Some(raw) => raw
            .parse::<CampaignStatus>()
            .map_err(|e| SyncError::Validation(e.to_string())),
    }
}

fn count_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
