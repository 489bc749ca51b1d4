pub mod app_config;
pub mod campaigns;
pub mod config;
pub mod creators;
pub mod dashboard;
pub mod metrics;

pub use app_config::{AppConfig, Environment, PhylloEnvironment};
pub use campaigns::{CampaignStatus, Deliverable, PerformanceMetrics};
pub use config::{load_app_config, load_app_config_from_env};
pub use creators::{new_external_id, ContactInfo, Preferences, VerificationStatus};
pub use dashboard::{format_compact, CreatorTotals, RosterStats};
pub use metrics::{compute_platform_metrics, PlatformMetrics, PostStats};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid verification status: {0}")]
    InvalidVerificationStatus(String),
    #[error("invalid campaign status: {0}")]
    InvalidCampaignStatus(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
