use std::sync::Arc;

use chrono::{TimeZone, Utc};

use botmeter_core::report::{CeilingKind, UsageReporter};
use botmeter_core::{
    ActionKind, AdmissionService, BurstThresholds, PlanTier, QuotaPolicy, Subscription,
    SubscriptionStatus, TenantId,
};
use botmeter_duckdb::DuckDbBackend;

fn tenant(id: &str) -> TenantId {
    TenantId::parse(id).expect("tenant id")
}

fn setup() -> (AdmissionService, UsageReporter, Arc<DuckDbBackend>) {
    let db = Arc::new(DuckDbBackend::open_in_memory().expect("db"));
    let service = AdmissionService::new(
        QuotaPolicy::default(),
        BurstThresholds::default(),
        db.clone(),
        db.clone(),
    );
    let reporter = UsageReporter::new(QuotaPolicy::default(), db.clone(), 80.0);
    (service, reporter, db)
}

#[tokio::test]
async fn snapshot_is_not_found_without_subscription() {
    let (_service, reporter, _db) = setup();
    let snapshot = reporter
        .limits_snapshot(&tenant("r1"), None, Utc::now())
        .await
        .expect("snapshot");
    assert!(snapshot.is_none(), "must signal not-found, not a zero-filled snapshot");
}

#[tokio::test]
async fn snapshot_combines_limits_usage_and_remaining() {
    let (service, reporter, _db) = setup();
    let t = tenant("r2");
    let sub = Subscription {
        tier: PlanTier::Trial,
        status: SubscriptionStatus::Trial,
    };
    let now = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();

    for i in 0..4 {
        let at = now + chrono::Duration::minutes(i * 4);
        service
            .record_usage(&t, ActionKind::Message, &format!("snap-{i}"), at)
            .await
            .expect("record");
    }
    service
        .record_usage(&t, ActionKind::Document, "snap-doc", now)
        .await
        .expect("record");

    let snapshot = reporter
        .limits_snapshot(&t, Some(&sub), now + chrono::Duration::hours(1))
        .await
        .expect("snapshot")
        .expect("present");

    assert_eq!(snapshot.plan, PlanTier::Trial);
    assert_eq!(snapshot.limits.daily_messages, 10);
    // 4 messages + 1 document (which also counts as a message).
    assert_eq!(snapshot.usage.daily_messages, 5);
    assert_eq!(snapshot.usage.daily_documents, 1);
    assert_eq!(snapshot.usage.monthly_messages, 5);
    assert_eq!(snapshot.remaining.daily_messages, 5);
    assert_eq!(snapshot.remaining.monthly_messages, 95);
    assert_eq!(snapshot.remaining.daily_documents, 2);
    assert_eq!(snapshot.remaining.monthly_documents, 19);
}

#[tokio::test]
async fn snapshot_serializes_with_stable_shape() {
    let (_service, reporter, _db) = setup();
    let sub = Subscription {
        tier: PlanTier::Standard,
        status: SubscriptionStatus::Active,
    };
    let snapshot = reporter
        .limits_snapshot(&tenant("r3"), Some(&sub), Utc::now())
        .await
        .expect("snapshot")
        .expect("present");

    let value = serde_json::to_value(&snapshot).expect("json");
    assert_eq!(value["plan"], "standard");
    for section in ["limits", "usage", "remaining"] {
        for field in [
            "daily_messages",
            "monthly_messages",
            "daily_documents",
            "monthly_documents",
        ] {
            assert!(
                value[section][field].is_u64(),
                "missing {section}.{field}"
            );
        }
    }
}

#[tokio::test]
async fn near_limit_report_flags_tenants_at_eighty_percent() {
    let (service, reporter, _db) = setup();
    let now = Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap();

    let hot = tenant("hot");
    let cold = tenant("cold");
    let trial = Subscription {
        tier: PlanTier::Trial,
        status: SubscriptionStatus::Trial,
    };

    // 8 of 10 daily messages = 80%, exactly at the threshold.
    for i in 0..8 {
        let at = now + chrono::Duration::minutes(i * 4);
        service
            .record_usage(&hot, ActionKind::Message, &format!("hot-{i}"), at)
            .await
            .expect("record");
    }
    service
        .record_usage(&cold, ActionKind::Message, "cold-1", now)
        .await
        .expect("record");

    let roster = vec![(hot.clone(), trial), (cold.clone(), trial)];
    let flagged = reporter
        .near_limit_report(&roster, now + chrono::Duration::hours(1))
        .await
        .expect("report");

    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].tenant, hot);
    assert_eq!(flagged[0].ceiling, CeilingKind::DailyMessages);
    assert!((flagged[0].percent_used - 80.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn near_limit_report_skips_inactive_tenants() {
    let (service, reporter, _db) = setup();
    let now = Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap();

    let t = tenant("gone");
    for i in 0..9 {
        let at = now + chrono::Duration::minutes(i * 4);
        service
            .record_usage(&t, ActionKind::Message, &format!("g-{i}"), at)
            .await
            .expect("record");
    }

    let roster = vec![(
        t,
        Subscription {
            tier: PlanTier::Trial,
            status: SubscriptionStatus::Cancelled,
        },
    )];
    let flagged = reporter
        .near_limit_report(&roster, now + chrono::Duration::hours(1))
        .await
        .expect("report");
    assert!(flagged.is_empty());
}
