//! `RateWindowStore` implementation: fixed-window burst counters.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use botmeter_core::tenant::TenantId;
use botmeter_core::usage::{RateWindowStore, WindowKind};

use crate::backend::{fmt_ts, DuckDbBackend};

#[async_trait]
impl RateWindowStore for DuckDbBackend {
    async fn window_count(
        &self,
        tenant: &TenantId,
        kind: WindowKind,
        window_start: DateTime<Utc>,
    ) -> Result<u64> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT request_count FROM rate_windows \
             WHERE tenant_id = ?1 AND window_kind = ?2 AND window_start = ?3",
        )?;
        let count = stmt.query_row(
            duckdb::params![tenant.as_str(), kind.as_str(), fmt_ts(window_start)],
            |row| row.get::<_, i64>(0),
        );
        match count {
            Ok(c) => Ok(c.max(0) as u64),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    async fn increment_windows(&self, tenant: &TenantId, now: DateTime<Utc>) -> Result<()> {
        let mut conn = self.conn.lock().await;
        // Both windows move together; one transaction, one fsync.
        let tx = conn.transaction()?;
        for kind in [WindowKind::Minute, WindowKind::Hour] {
            tx.execute(
                "INSERT INTO rate_windows (tenant_id, window_kind, window_start, request_count) \
                 VALUES (?1, ?2, ?3, 1) \
                 ON CONFLICT (tenant_id, window_kind, window_start) DO UPDATE SET \
                     request_count = rate_windows.request_count + 1",
                duckdb::params![tenant.as_str(), kind.as_str(), fmt_ts(kind.truncate(now))],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn purge_tenant(&self, tenant: &TenantId) -> Result<u64> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute(
            "DELETE FROM rate_windows WHERE tenant_id = ?1",
            duckdb::params![tenant.as_str()],
        )?;
        Ok(deleted as u64)
    }

    async fn sweep_windows_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute(
            "DELETE FROM rate_windows WHERE window_start < ?1",
            duckdb::params![fmt_ts(cutoff)],
        )?;
        Ok(deleted as u64)
    }
}
