//! Live integration tests for creatordb-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. `"../../migrations"` resolves to the workspace
//! migration directory.

use creatordb_core::{
    compute_platform_metrics, CampaignStatus, ContactInfo, Deliverable, PerformanceMetrics,
    PlatformMetrics, PostStats, Preferences, VerificationStatus,
};
use creatordb_db::{
    complete_sync_run, count_creators, create_sync_run, deactivate_platform, fail_sync_run,
    get_creator_by_public_id, get_sync_run, insert_campaign, insert_creator,
    list_campaigns_for_creator, list_creator_public_ids, list_platforms_for_creator,
    list_platforms_for_creators, list_sync_runs_for_creator, search_creators,
    update_verification_status, CreatorFilter, CreatorRow, DbError, NewCampaign, NewCreator,
    PlatformSnapshot, SyncRunOutcome, TriggerSource,
};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_test_creator(pool: &sqlx::PgPool, suffix: &str, location: Option<&str>) -> CreatorRow {
    let contact = ContactInfo::default();
    let prefs = Preferences::default();
    let phyllo_user_id = format!("phyllo-{suffix}");
    let external_id = format!("creator_{suffix}");
    let name = format!("Creator {suffix}");
    let email = format!("{suffix}@example.com");
    insert_creator(
        pool,
        &NewCreator {
            phyllo_user_id: &phyllo_user_id,
            external_id: &external_id,
            name: &name,
            email: &email,
            bio: None,
            location,
            profile_picture_url: None,
            contact_info: &contact,
            preferences: &prefs,
        },
    )
    .await
    .unwrap_or_else(|e| panic!("insert_test_creator failed for '{suffix}': {e}"))
}

fn metrics(followers: i64, engagement_rate: f64) -> PlatformMetrics {
    PlatformMetrics {
        followers_count: followers,
        engagement_rate,
        ..PlatformMetrics::default()
    }
}

async fn upsert(pool: &sqlx::PgPool, creator_id: i64, platform: &str, account: &str, m: PlatformMetrics) -> creatordb_db::PlatformRow {
    creatordb_db::upsert_platform_snapshot(
        pool,
        creator_id,
        &PlatformSnapshot {
            platform_name: platform,
            external_account_id: account,
            platform_username: "handle",
            platform_url: None,
            metrics: m,
            audience_demographics: None,
        },
    )
    .await
    .expect("upsert_platform_snapshot failed")
}

// ---------------------------------------------------------------------------
// Creators
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn insert_creator_starts_pending(pool: sqlx::PgPool) {
    let creator = insert_test_creator(&pool, "a", Some("Austin, TX")).await;
    assert_eq!(creator.verification_status, "pending");
    assert_eq!(creator.contact_info.0, ContactInfo::default());

    let fetched = get_creator_by_public_id(&pool, creator.public_id)
        .await
        .expect("query failed")
        .expect("creator should exist");
    assert_eq!(fetched.id, creator.id);
    assert_eq!(fetched.location.as_deref(), Some("Austin, TX"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_phyllo_user_id_is_rejected(pool: sqlx::PgPool) {
    insert_test_creator(&pool, "dup", None).await;
    let contact = ContactInfo::default();
    let prefs = Preferences::default();
    let result = insert_creator(
        &pool,
        &NewCreator {
            phyllo_user_id: "phyllo-dup",
            external_id: "creator_other",
            name: "Other",
            email: "other@example.com",
            bio: None,
            location: None,
            profile_picture_url: None,
            contact_info: &contact,
            preferences: &prefs,
        },
    )
    .await;
    assert!(matches!(result, Err(DbError::Sqlx(_))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_verification_status_sets_value(pool: sqlx::PgPool) {
    let creator = insert_test_creator(&pool, "v", None).await;
    let updated = update_verification_status(&pool, creator.public_id, VerificationStatus::Verified)
        .await
        .expect("update failed");
    assert_eq!(updated.status(), VerificationStatus::Verified);
    assert!(updated.updated_at >= creator.updated_at);
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_verification_status_unknown_id_inserts_nothing(pool: sqlx::PgPool) {
    let result =
        update_verification_status(&pool, Uuid::new_v4(), VerificationStatus::Verified).await;
    assert!(matches!(result, Err(DbError::NotFound)));

    let total = count_creators(&pool, &CreatorFilter::default())
        .await
        .expect("count failed");
    assert_eq!(total, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn check_constraint_rejects_unknown_status(pool: sqlx::PgPool) {
    let creator = insert_test_creator(&pool, "chk", None).await;
    let result = sqlx::query("UPDATE creators SET verification_status = 'approved' WHERE id = $1")
        .bind(creator.id)
        .execute(&pool)
        .await;
    assert!(result.is_err(), "CHECK constraint should reject 'approved'");
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn min_followers_excludes_small_creators(pool: sqlx::PgPool) {
    let small = insert_test_creator(&pool, "small", None).await;
    let big = insert_test_creator(&pool, "big", None).await;
    upsert(&pool, small.id, "instagram", "s-1", metrics(500, 1.0)).await;
    upsert(&pool, small.id, "youtube", "s-2", metrics(999, 1.0)).await;
    upsert(&pool, big.id, "instagram", "b-1", metrics(5_000, 2.0)).await;

    let filter = CreatorFilter {
        min_followers: Some(1_000),
        ..CreatorFilter::default()
    };
    let rows = search_creators(&pool, &filter, 20, 0).await.expect("search failed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, big.id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn raising_min_followers_never_increases_count(pool: sqlx::PgPool) {
    for (i, followers) in [100_i64, 1_000, 10_000, 100_000].into_iter().enumerate() {
        let creator = insert_test_creator(&pool, &format!("m{i}"), None).await;
        upsert(&pool, creator.id, "tiktok", &format!("acc-{i}"), metrics(followers, 1.0)).await;
    }

    let mut previous = i64::MAX;
    for threshold in [0_i64, 500, 1_000, 50_000, 1_000_000] {
        let filter = CreatorFilter {
            min_followers: Some(threshold),
            ..CreatorFilter::default()
        };
        let count = count_creators(&pool, &filter).await.expect("count failed");
        assert!(count <= previous, "count rose at threshold {threshold}");
        previous = count;
    }
    assert_eq!(previous, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn platform_predicates_hold_on_one_row(pool: sqlx::PgPool) {
    // Big on YouTube, small on Instagram: "instagram with >= 1000" must not match.
    let creator = insert_test_creator(&pool, "split", None).await;
    upsert(&pool, creator.id, "youtube", "y-1", metrics(50_000, 1.0)).await;
    upsert(&pool, creator.id, "instagram", "i-1", metrics(200, 1.0)).await;

    let filter = CreatorFilter {
        platform: Some("instagram".to_string()),
        min_followers: Some(1_000),
        ..CreatorFilter::default()
    };
    assert_eq!(count_creators(&pool, &filter).await.expect("count failed"), 0);

    let filter = CreatorFilter {
        platform: Some("youtube".to_string()),
        min_followers: Some(1_000),
        ..CreatorFilter::default()
    };
    assert_eq!(count_creators(&pool, &filter).await.expect("count failed"), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn location_and_status_filters_combine(pool: sqlx::PgPool) {
    let austin = insert_test_creator(&pool, "austin", Some("Austin, TX")).await;
    insert_test_creator(&pool, "boston", Some("Boston, MA")).await;
    update_verification_status(&pool, austin.public_id, VerificationStatus::Verified)
        .await
        .expect("update failed");

    let filter = CreatorFilter {
        location: Some("austin".to_string()),
        verification_status: Some(VerificationStatus::Verified),
        ..CreatorFilter::default()
    };
    let rows = search_creators(&pool, &filter, 20, 0).await.expect("search failed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, austin.id);

    let filter = CreatorFilter {
        location: Some("%".to_string()),
        ..CreatorFilter::default()
    };
    assert_eq!(
        count_creators(&pool, &filter).await.expect("count failed"),
        0,
        "'%' must match literally"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn paging_reports_full_count(pool: sqlx::PgPool) {
    for i in 0..5 {
        insert_test_creator(&pool, &format!("p{i}"), None).await;
    }
    let filter = CreatorFilter::default();
    let page = search_creators(&pool, &filter, 2, 4).await.expect("search failed");
    assert_eq!(page.len(), 1);
    assert_eq!(count_creators(&pool, &filter).await.expect("count failed"), 5);

    let ids = list_creator_public_ids(&pool).await.expect("list failed");
    assert_eq!(ids.len(), 5);
}

#[sqlx::test(migrations = "../../migrations")]
async fn inactive_platforms_do_not_match_platform_filters(pool: sqlx::PgPool) {
    let creator = insert_test_creator(&pool, "gone", None).await;
    upsert(&pool, creator.id, "twitch", "t-1", metrics(10_000, 1.0)).await;
    deactivate_platform(&pool, creator.id, "t-1")
        .await
        .expect("deactivate failed");

    let filter = CreatorFilter {
        platform: Some("twitch".to_string()),
        ..CreatorFilter::default()
    };
    assert_eq!(count_creators(&pool, &filter).await.expect("count failed"), 0);
}

// ---------------------------------------------------------------------------
// Platforms
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_twice_keeps_id_and_overwrites_metrics(pool: sqlx::PgPool) {
    let creator = insert_test_creator(&pool, "up", None).await;
    let posts = [
        PostStats {
            like_count: 10,
            comment_count: 5,
            share_count: 2,
            follower_count: 100,
            ..PostStats::default()
        },
        PostStats {
            like_count: 20,
            follower_count: 100,
            ..PostStats::default()
        },
    ];
    let first = upsert(&pool, creator.id, "instagram", "acc-1", compute_platform_metrics(100, 10, &posts)).await;
    assert_eq!(first.avg_likes, 15);
    assert!(first.last_synced_at.is_some());

    let second = upsert(&pool, creator.id, "instagram", "acc-1", metrics(250, 4.0)).await;
    assert_eq!(second.id, first.id);
    assert_eq!(second.public_id, first.public_id);
    assert_eq!(second.followers_count, 250);
    assert_eq!(second.avg_likes, 0, "every metric column is overwritten");

    let rows = list_platforms_for_creator(&pool, creator.id).await.expect("list failed");
    assert_eq!(rows.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_reactivates_deactivated_platform(pool: sqlx::PgPool) {
    let creator = insert_test_creator(&pool, "re", None).await;
    upsert(&pool, creator.id, "youtube", "y-9", metrics(10, 0.0)).await;
    let inactive = deactivate_platform(&pool, creator.id, "y-9")
        .await
        .expect("deactivate failed");
    assert!(!inactive.is_active);

    let active = upsert(&pool, creator.id, "youtube", "y-9", metrics(20, 0.0)).await;
    assert!(active.is_active);
}

#[sqlx::test(migrations = "../../migrations")]
async fn deactivate_unknown_account_is_not_found(pool: sqlx::PgPool) {
    let creator = insert_test_creator(&pool, "nf", None).await;
    let result = deactivate_platform(&pool, creator.id, "missing").await;
    assert!(matches!(result, Err(DbError::NotFound)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_platforms_for_creators_batches(pool: sqlx::PgPool) {
    let a = insert_test_creator(&pool, "ba", None).await;
    let b = insert_test_creator(&pool, "bb", None).await;
    upsert(&pool, a.id, "instagram", "a-1", metrics(1, 0.0)).await;
    upsert(&pool, b.id, "instagram", "b-1", metrics(2, 0.0)).await;
    upsert(&pool, b.id, "youtube", "b-2", metrics(3, 0.0)).await;

    let rows = list_platforms_for_creators(&pool, &[a.id, b.id])
        .await
        .expect("list failed");
    assert_eq!(rows.len(), 3);
    assert!(list_platforms_for_creators(&pool, &[]).await.expect("empty").is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn deleting_creator_cascades(pool: sqlx::PgPool) {
    let creator = insert_test_creator(&pool, "del", None).await;
    upsert(&pool, creator.id, "instagram", "d-1", metrics(1, 0.0)).await;
    create_sync_run(&pool, creator.id, TriggerSource::Cli)
        .await
        .expect("create run failed");

    sqlx::query("DELETE FROM creators WHERE id = $1")
        .bind(creator.id)
        .execute(&pool)
        .await
        .expect("delete failed");

    let remaining: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM creator_platforms) + (SELECT COUNT(*) FROM sync_runs)",
    )
    .fetch_one(&pool)
    .await
    .expect("count failed");
    assert_eq!(remaining, 0);
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn campaign_round_trips_json_columns(pool: sqlx::PgPool) {
    let creator = insert_test_creator(&pool, "camp", None).await;
    let deliverables = [Deliverable {
        platform: "instagram".to_string(),
        content_type: "reel".to_string(),
        quantity: 2,
        specifications: None,
    }];
    let performance = PerformanceMetrics::default();
    let row = insert_campaign(
        &pool,
        creator.id,
        &NewCampaign {
            campaign_name: "Spring launch",
            description: None,
            brand_name: "Acme",
            status: CampaignStatus::Draft,
            budget: Some(rust_decimal::Decimal::new(150_000, 2)),
            currency: "USD",
            deliverables: &deliverables,
            performance_metrics: &performance,
            start_date: None,
            end_date: None,
        },
    )
    .await
    .expect("insert_campaign failed");

    assert_eq!(row.status, "draft");
    assert_eq!(row.budget.map(|b| b.to_string()).as_deref(), Some("1500.00"));
    assert_eq!(row.deliverables.0[0].quantity, 2);

    let listed = list_campaigns_for_creator(&pool, creator.id)
        .await
        .expect("list failed");
    assert_eq!(listed.len(), 1);
}

// ---------------------------------------------------------------------------
// Sync runs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn sync_run_lifecycle_running_to_partial(pool: sqlx::PgPool) {
    let creator = insert_test_creator(&pool, "run", None).await;
    let run = create_sync_run(&pool, creator.id, TriggerSource::Api)
        .await
        .expect("create failed");
    assert_eq!(run.status, "running");
    assert_eq!(run.trigger_source, "api");

    complete_sync_run(&pool, run.id, SyncRunOutcome::Partial, 1, 1, Some("acc-2: boom"))
        .await
        .expect("complete failed");

    let closed = get_sync_run(&pool, run.id).await.expect("get failed");
    assert_eq!(closed.status, "partial");
    assert_eq!(closed.accounts_synced, 1);
    assert!(closed.completed_at.is_some());

    let again = fail_sync_run(&pool, run.id, "late").await;
    assert!(matches!(
        again,
        Err(DbError::InvalidSyncRunTransition {
            expected_status: "running",
            ..
        })
    ));

    let runs = list_sync_runs_for_creator(&pool, creator.id, 10)
        .await
        .expect("list failed");
    assert_eq!(runs.len(), 1);
}
