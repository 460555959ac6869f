use chrono::{TimeZone, Utc};

use botmeter_core::config::Retention;
use botmeter_core::{ActionKind, RateWindowStore, TenantId, UsageStore, WindowKind};
use botmeter_duckdb::DuckDbBackend;

fn tenant(id: &str) -> TenantId {
    TenantId::parse(id).expect("tenant id")
}

#[tokio::test]
async fn sweep_removes_aged_usage_and_keeps_recent() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let t = tenant("s1");
    let now = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();

    let old = now - chrono::Duration::days(400);
    let recent = now - chrono::Duration::days(10);
    db.increment_daily(&t, ActionKind::Message, old)
        .await
        .expect("increment");
    db.increment_daily(&t, ActionKind::Message, recent)
        .await
        .expect("increment");

    let report = db.sweep(now, &Retention::default()).await.expect("sweep");
    assert_eq!(report.usage_deleted, 1);

    assert!(db.daily_usage(&t, old.date_naive()).await.expect("read").is_none());
    assert!(db
        .daily_usage(&t, recent.date_naive())
        .await
        .expect("read")
        .is_some());
}

#[tokio::test]
async fn sweep_removes_windows_older_than_two_hours() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let t = tenant("s2");
    let now = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();

    let stale = now - chrono::Duration::hours(3);
    db.increment_windows(&t, stale).await.expect("increment");
    db.increment_windows(&t, now).await.expect("increment");

    let report = db.sweep(now, &Retention::default()).await.expect("sweep");
    // Stale minute and hour rows both gone.
    assert_eq!(report.windows_deleted, 2);

    let current = db
        .window_count(&t, WindowKind::Minute, WindowKind::Minute.truncate(now))
        .await
        .expect("count");
    assert_eq!(current, 1);
}

#[tokio::test]
async fn sweep_trims_the_idempotency_ledger() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let t = tenant("s3");
    let now = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();

    let stale = now - chrono::Duration::hours(3);
    assert!(db.claim_action(&t, "old-action", stale).await.expect("claim"));
    assert!(db.claim_action(&t, "new-action", now).await.expect("claim"));

    let report = db.sweep(now, &Retention::default()).await.expect("sweep");
    assert_eq!(report.actions_deleted, 1);

    // The swept id can be claimed again; the recent one still cannot.
    assert!(db.claim_action(&t, "old-action", now).await.expect("claim"));
    assert!(!db.claim_action(&t, "new-action", now).await.expect("claim"));
}

#[tokio::test]
async fn second_sweep_deletes_nothing() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let t = tenant("s4");
    let now = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();

    db.increment_daily(&t, ActionKind::Message, now - chrono::Duration::days(400))
        .await
        .expect("increment");
    db.increment_windows(&t, now - chrono::Duration::hours(5))
        .await
        .expect("increment");

    let first = db.sweep(now, &Retention::default()).await.expect("sweep");
    assert!(first.usage_deleted > 0);
    assert!(first.windows_deleted > 0);

    let second = db.sweep(now, &Retention::default()).await.expect("sweep");
    assert_eq!(second.usage_deleted, 0);
    assert_eq!(second.windows_deleted, 0);
    assert_eq!(second.actions_deleted, 0);
}

#[tokio::test]
async fn custom_horizons_are_honored() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let t = tenant("s5");
    let now = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
    let retention = Retention {
        window_horizon_hours: 1,
        usage_horizon_days: 30,
    };

    db.increment_daily(&t, ActionKind::Message, now - chrono::Duration::days(31))
        .await
        .expect("increment");
    db.increment_windows(&t, now - chrono::Duration::minutes(90))
        .await
        .expect("increment");

    let report = db.sweep(now, &retention).await.expect("sweep");
    assert_eq!(report.usage_deleted, 1);
    assert_eq!(report.windows_deleted, 2);
}
