//! Creator aggregation service.
//!
//! Combines the Phyllo client with the creator tables: registering creators,
//! pulling per-account metrics into platform snapshots, verification,
//! search and campaign bookkeeping.

pub mod error;
pub mod service;
pub mod types;

pub use creatordb_db::TriggerSource;
pub use error::SyncError;
pub use service::{CreatorService, SyncSettings};
pub use types::{
    normalize_paging, BulkSyncEntry, BulkSyncSummary, CampaignView, CreatorSearch, CreatorView,
    FailedAccount, NewCampaignInput, NewCreatorInput, PlatformView, SearchPage, SkippedAccount,
    SyncOutcome, SyncReport, SyncRunView, SyncedAccount, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
