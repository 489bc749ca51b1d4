//! Background job scheduler.
//!
//! Registers the recurring creator sync when `CREATORDB_SYNC_CRON` is set.

use std::sync::Arc;

use creatordb_sync::{CreatorService, TriggerSource};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the scheduler with the creator sync job on `cron`.
///
/// The returned [`JobScheduler`] must be kept alive for the lifetime of the
/// process; dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if `cron` does not parse, the job cannot be
/// registered, or the scheduler fails to start.
pub async fn build_scheduler(
    service: Arc<CreatorService>,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let job = sync_job(service, cron)?;

    let scheduler = JobScheduler::new().await?;
    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!(cron, "scheduler: creator sync job registered");
    Ok(scheduler)
}

fn sync_job(service: Arc<CreatorService>, cron: &str) -> Result<Job, JobSchedulerError> {
    Job::new_async(cron, move |_uuid, _lock| {
        let service = Arc::clone(&service);

        Box::pin(async move {
            tracing::info!("scheduler: starting creator sync run");
            match service.sync_all_creators(TriggerSource::Scheduler).await {
                Ok(summary) => tracing::info!(
                    succeeded = summary.succeeded_creators(),
                    failed = summary.failed_creators(),
                    "scheduler: creator sync run complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: creator sync run failed"),
            }
        })
    })
}
