//! Derived reach/engagement metrics for one connected account.
//!
//! Every value here is computed from the latest provider engagement window
//! and replaces the previous snapshot wholesale.

use serde::{Deserialize, Serialize};

/// Per-post counters the metric formulas read.
///
/// Providers omit counters they do not track for a platform; missing values
/// count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStats {
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default)]
    pub share_count: i64,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub follower_count: i64,
}

/// Metrics snapshot stored on a platform row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformMetrics {
    pub followers_count: i64,
    pub following_count: i64,
    pub posts_count: i64,
    pub engagement_rate: f64,
    pub avg_likes: i64,
    pub avg_comments: i64,
    pub avg_shares: i64,
    pub total_views: i64,
}

/// Build the full metrics snapshot from identity counts and an engagement window.
#[must_use]
pub fn compute_platform_metrics(
    followers_count: i64,
    following_count: i64,
    posts: &[PostStats],
) -> PlatformMetrics {
    PlatformMetrics {
        followers_count,
        following_count,
        posts_count: i64::try_from(posts.len()).unwrap_or(i64::MAX),
        engagement_rate: engagement_rate(posts),
        avg_likes: average(posts, |p| p.like_count),
        avg_comments: average(posts, |p| p.comment_count),
        avg_shares: average(posts, |p| p.share_count),
        total_views: total(posts, |p| p.view_count),
    }
}

/// Average per-post interactions as a percentage of average followers.
///
/// Returns `0.0` for an empty window or when no post reports followers.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn engagement_rate(posts: &[PostStats]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    let n = posts.len() as f64;
    let interactions = total(posts, |p| {
        p.like_count
            .saturating_add(p.comment_count)
            .saturating_add(p.share_count)
    }) as f64;
    let avg_followers = total(posts, |p| p.follower_count) as f64 / n;
    if avg_followers <= 0.0 {
        return 0.0;
    }
    100.0 * (interactions / n) / avg_followers
}

/// Rounded mean of one counter; `0` for an empty window.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]
pub fn average(posts: &[PostStats], metric: impl Fn(&PostStats) -> i64) -> i64 {
    if posts.is_empty() {
        return 0;
    }
    let sum = total(posts, metric) as f64;
    (sum / posts.len() as f64).round() as i64
}

#[must_use]
pub fn total(posts: &[PostStats], metric: impl Fn(&PostStats) -> i64) -> i64 {
    posts.iter().map(metric).fold(0_i64, i64::saturating_add)
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod tests;
