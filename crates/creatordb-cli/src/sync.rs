//! Sync command handlers for the CLI.
//!
//! Per-creator failures during `sync-all` are printed and counted rather
//! than propagated, so one bad creator does not abort the run.

use std::sync::Arc;

use creatordb_phyllo::PhylloClient;
use creatordb_sync::{BulkSyncEntry, CreatorService, SyncOutcome, SyncSettings, TriggerSource};
use uuid::Uuid;

pub(crate) fn build_service(
    pool: sqlx::PgPool,
    config: &creatordb_core::AppConfig,
) -> anyhow::Result<CreatorService> {
    let phyllo = PhylloClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build Phyllo client: {e}"))?;
    Ok(CreatorService::new(
        pool,
        Arc::new(phyllo),
        SyncSettings::from_app_config(config),
    ))
}

pub(crate) fn format_outcome(outcome: &SyncOutcome) -> String {
    let mut line = format!(
        "{}: synced {}, failed {}, skipped {} (run {})",
        outcome.creator.id,
        outcome.report.synced.len(),
        outcome.report.failed.len(),
        outcome.report.skipped.len(),
        outcome.run_id
    );
    if let Some(summary) = outcome.report.failure_summary() {
        line.push_str(" - ");
        line.push_str(&summary);
    }
    line
}

pub(crate) fn format_entry(entry: &BulkSyncEntry) -> String {
    match &entry.error {
        Some(error) => format!("{}: error - {error}", entry.creator_id),
        None => format!(
            "{}: synced {}, failed {}, skipped {}",
            entry.creator_id, entry.synced, entry.failed, entry.skipped
        ),
    }
}

/// Syncs one creator and prints its report line.
///
/// # Errors
///
/// Returns an error if the creator is unknown or its account list cannot be
/// fetched.
pub(crate) async fn run_sync_one(service: &CreatorService, creator_id: Uuid) -> anyhow::Result<()> {
    let outcome = service
        .sync_creator_platforms(creator_id, TriggerSource::Cli)
        .await?;
    println!("{}", format_outcome(&outcome));
    Ok(())
}

/// Syncs every creator, printing one line each and a closing total.
///
/// # Errors
///
/// Returns an error only if the creator list cannot be loaded.
pub(crate) async fn run_sync_all(service: &CreatorService) -> anyhow::Result<()> {
    let summary = service.sync_all_creators(TriggerSource::Cli).await?;
    for entry in &summary.entries {
        println!("{}", format_entry(entry));
    }
    println!(
        "sync-all complete: {} succeeded, {} failed",
        summary.succeeded_creators(),
        summary.failed_creators()
    );
    Ok(())
}
