use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Moderation state of a creator profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Suspended,
    Rejected,
}

impl VerificationStatus {
    pub const ALL: [VerificationStatus; 4] = [
        VerificationStatus::Pending,
        VerificationStatus::Verified,
        VerificationStatus::Suspended,
        VerificationStatus::Rejected,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Suspended => "suspended",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::InvalidVerificationStatus(s.to_string()))
    }
}

/// Optional contact details stored as JSON on the creator row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_email: Option<String>,
}

/// Collaboration preferences stored as JSON on the creator row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub collaboration_types: Vec<String>,
    #[serde(default)]
    pub content_categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_budget: Option<f64>,
}

/// Generate the external id we register with the provider for a new creator.
#[must_use]
pub fn new_external_id() -> String {
    format!("creator_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_status_parses_every_variant() {
        for status in VerificationStatus::ALL {
            assert_eq!(status.as_str().parse::<VerificationStatus>().unwrap(), status);
        }
    }

    #[test]
    fn verification_status_rejects_unknown_value() {
        let err = "approved".parse::<VerificationStatus>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidVerificationStatus(ref v) if v == "approved"));
    }

    #[test]
    fn verification_status_is_case_sensitive() {
        assert!("Verified".parse::<VerificationStatus>().is_err());
    }

    #[test]
    fn verification_status_serializes_lowercase() {
        let json = serde_json::to_string(&VerificationStatus::Suspended).unwrap();
        assert_eq!(json, "\"suspended\"");
    }

    #[test]
    fn preferences_default_missing_lists() {
        let prefs: Preferences = serde_json::from_str(r#"{"min_budget": 500}"#).unwrap();
        assert!(prefs.collaboration_types.is_empty());
        assert!(prefs.content_categories.is_empty());
        assert_eq!(prefs.min_budget, Some(500.0));
    }

    #[test]
    fn external_id_has_creator_prefix_and_is_unique() {
        let a = new_external_id();
        let b = new_external_id();
        assert!(a.starts_with("creator_"));
        assert_ne!(a, b);
    }
}
