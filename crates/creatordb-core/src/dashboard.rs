//! Display aggregates shown on the admin roster and the creator dashboard.

use serde::Serialize;

use crate::creators::VerificationStatus;
use crate::metrics::PlatformMetrics;

/// Cross-platform totals for a single creator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CreatorTotals {
    pub platform_count: usize,
    pub total_followers: i64,
    pub total_posts: i64,
    /// Unweighted mean of each platform's engagement rate.
    pub avg_engagement_rate: f64,
}

impl CreatorTotals {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_platforms<'a>(platforms: impl IntoIterator<Item = &'a PlatformMetrics>) -> Self {
        let mut totals = Self::default();
        let mut engagement_sum = 0.0;
        for m in platforms {
            totals.platform_count += 1;
            totals.total_followers = totals.total_followers.saturating_add(m.followers_count);
            totals.total_posts = totals.total_posts.saturating_add(m.posts_count);
            engagement_sum += m.engagement_rate;
        }
        if totals.platform_count > 0 {
            totals.avg_engagement_rate = engagement_sum / totals.platform_count as f64;
        }
        totals
    }
}

/// Headline counts for a page of creators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RosterStats {
    pub total: i64,
    pub verified: usize,
    pub pending: usize,
    pub total_followers: i64,
}

impl RosterStats {
    /// `total` is the full match count; the other fields cover only `page`.
    #[must_use]
    pub fn from_page<'a>(
        total: i64,
        page: impl IntoIterator<Item = (VerificationStatus, &'a CreatorTotals)>,
    ) -> Self {
        let mut stats = Self {
            total,
            ..Self::default()
        };
        for (status, totals) in page {
            match status {
                VerificationStatus::Verified => stats.verified += 1,
                VerificationStatus::Pending => stats.pending += 1,
                VerificationStatus::Suspended | VerificationStatus::Rejected => {}
            }
            stats.total_followers = stats.total_followers.saturating_add(totals.total_followers);
        }
        stats
    }
}

/// Render a count with a one-decimal `K`/`M` suffix, e.g. `12.3K`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_compact(n: i64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
