//! Retention sweeper: periodic bulk deletion of aged counter rows.
//!
//! The trigger lives outside this crate (cron-like scheduler); daily
//! invocation is sufficient for the default horizons.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use botmeter_core::config::Retention;
use botmeter_core::usage::{RateWindowStore, SweepReport, UsageStore};

use crate::backend::DuckDbBackend;

impl DuckDbBackend {
    /// Delete rate windows and ledger entries older than the short horizon
    /// and usage rows older than the long horizon.
    ///
    /// Idempotent: a second run with no new data deletes zero rows. Safe
    /// to run concurrently with admission checks — a swept record is by
    /// construction outside any window still being evaluated. A failed
    /// sweep is not fatal; the rows survive until the next invocation.
    pub async fn sweep(&self, now: DateTime<Utc>, retention: &Retention) -> Result<SweepReport> {
        let window_cutoff = now - Duration::hours(i64::from(retention.window_horizon_hours));
        let usage_cutoff = now.date_naive() - Duration::days(i64::from(retention.usage_horizon_days));

        let windows_deleted = self.sweep_windows_before(window_cutoff).await?;
        let usage_deleted = self.sweep_usage_before(usage_cutoff).await?;
        let actions_deleted = self.sweep_actions_before(window_cutoff).await?;

        let report = SweepReport {
            windows_deleted,
            usage_deleted,
            actions_deleted,
        };
        info!(
            windows_deleted,
            usage_deleted, actions_deleted, "retention sweep completed"
        );
        Ok(report)
    }
}
