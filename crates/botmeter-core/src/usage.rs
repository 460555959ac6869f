//! Counter records and the store abstractions they live behind.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::Serialize;

use crate::tenant::{ActionKind, TenantId};

/// Message/document counts for one aggregation scope (a day or a month).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionCounts {
    pub messages: u64,
    pub documents: u64,
}

/// One row per (tenant, calendar day). Created lazily on the first action
/// of that day; counts only increase except via administrative reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyUsage {
    pub tenant: TenantId,
    pub date: NaiveDate,
    pub counts: ActionCounts,
    pub last_activity: DateTime<Utc>,
}

/// Fixed-size burst window granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Minute,
    Hour,
}

impl WindowKind {
    /// Truncate `now` to this window's start boundary. Truncation is what
    /// makes "current window" lookup a single equality match instead of a
    /// range scan.
    pub fn truncate(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let truncated = match self {
            Self::Minute => now.with_second(0).and_then(|t| t.with_nanosecond(0)),
            Self::Hour => now
                .with_minute(0)
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0)),
        };
        truncated.unwrap_or(now)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
        }
    }
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Rows removed by one retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub windows_deleted: u64,
    pub usage_deleted: u64,
    pub actions_deleted: u64,
}

/// Durable per-day usage aggregates — the source of truth for "how much
/// has this tenant done".
///
/// Every increment must be an atomic increment-or-create at the store:
/// read-then-write-back loses updates under concurrency and is not an
/// acceptable implementation.
#[async_trait]
pub trait UsageStore: Send + Sync + 'static {
    /// Today's row, or `None` if the tenant has not acted on `date`.
    async fn daily_usage(&self, tenant: &TenantId, date: NaiveDate) -> Result<Option<DailyUsage>>;

    /// Summed counts over the inclusive `from..=through` date range.
    /// Zero counts when no rows exist.
    async fn month_usage(
        &self,
        tenant: &TenantId,
        from: NaiveDate,
        through: NaiveDate,
    ) -> Result<ActionCounts>;

    /// Atomically bump the counter(s) for `kind` on `now`'s calendar day,
    /// creating the row if absent, and refresh last-activity. A document
    /// increment also bumps the message counter (documents are transported
    /// as messages).
    async fn increment_daily(
        &self,
        tenant: &TenantId,
        kind: ActionKind,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Claim an idempotency key. Returns `true` on first claim, `false`
    /// when `action_id` was already recorded — the caller must then skip
    /// every counter increment for this action.
    async fn claim_action(
        &self,
        tenant: &TenantId,
        action_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// Administrative: zero the counters for `date` (row kept).
    async fn reset_daily(&self, tenant: &TenantId, date: NaiveDate) -> Result<()>;

    /// Administrative: delete every usage row for the tenant.
    async fn purge_tenant(&self, tenant: &TenantId) -> Result<u64>;

    /// Bulk-delete usage rows dated strictly before `cutoff`.
    async fn sweep_usage_before(&self, cutoff: NaiveDate) -> Result<u64>;

    /// Bulk-delete idempotency-ledger entries recorded before `cutoff`.
    async fn sweep_actions_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// Higher-churn per-window request counters, used only for burst control.
#[async_trait]
pub trait RateWindowStore: Send + Sync + 'static {
    /// Count for the given (kind, window start), zero when absent.
    /// `window_start` must already be truncated to the kind's boundary.
    async fn window_count(
        &self,
        tenant: &TenantId,
        kind: WindowKind,
        window_start: DateTime<Utc>,
    ) -> Result<u64>;

    /// Atomically bump both the current-minute and current-hour window
    /// rows for `now`, creating them if absent.
    async fn increment_windows(&self, tenant: &TenantId, now: DateTime<Utc>) -> Result<()>;

    /// Administrative: delete every window row for the tenant.
    async fn purge_tenant(&self, tenant: &TenantId) -> Result<u64>;

    /// Bulk-delete window rows starting strictly before `cutoff`.
    async fn sweep_windows_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn minute_truncation_zeroes_seconds() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).single();
        let now = now.unwrap_or_default();
        let start = WindowKind::Minute.truncate(now);
        assert_eq!(start.second(), 0);
        assert_eq!(start.minute(), 9);
        assert_eq!(start.hour(), 15);
    }

    #[test]
    fn hour_truncation_zeroes_minutes_and_seconds() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).single();
        let now = now.unwrap_or_default();
        let start = WindowKind::Hour.truncate(now);
        assert_eq!(start.second(), 0);
        assert_eq!(start.minute(), 0);
        assert_eq!(start.hour(), 15);
    }

    #[test]
    fn month_start_is_first_of_month() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap_or_default();
        assert_eq!(
            month_start(date),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap_or_default()
        );
    }
}
