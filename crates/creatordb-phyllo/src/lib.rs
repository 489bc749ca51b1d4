//! Phyllo identity/analytics API client.

pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::{PhylloClient, DEFAULT_BASE_URL};
pub use error::PhylloError;
pub use session::{AccessToken, TokenSession};
pub use types::{ConnectedAccount, EngagementPost, EngagementQuery, Identity, PhylloUser};
