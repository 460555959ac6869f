//! `UsageStore` implementation: daily counters, monthly sums, the
//! idempotency ledger, and the administrative reset paths.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use botmeter_core::tenant::{ActionKind, TenantId};
use botmeter_core::usage::{ActionCounts, DailyUsage, UsageStore};

use crate::backend::{fmt_ts, DuckDbBackend};

#[async_trait]
impl UsageStore for DuckDbBackend {
    async fn daily_usage(&self, tenant: &TenantId, date: NaiveDate) -> Result<Option<DailyUsage>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT message_count, document_count, CAST(last_activity AS VARCHAR) \
             FROM daily_usage WHERE tenant_id = ?1 AND usage_date = ?2",
        )?;

        let row = stmt.query_row(
            duckdb::params![tenant.as_str(), date.to_string()],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        );

        match row {
            Ok((messages, documents, last_activity)) => Ok(Some(DailyUsage {
                tenant: tenant.clone(),
                date,
                counts: ActionCounts {
                    messages: messages.max(0) as u64,
                    documents: documents.max(0) as u64,
                },
                last_activity: parse_ts(&last_activity)?,
            })),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn month_usage(
        &self,
        tenant: &TenantId,
        from: NaiveDate,
        through: NaiveDate,
    ) -> Result<ActionCounts> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT CAST(COALESCE(SUM(message_count), 0) AS BIGINT), \
                    CAST(COALESCE(SUM(document_count), 0) AS BIGINT) \
             FROM daily_usage \
             WHERE tenant_id = ?1 AND usage_date >= ?2 AND usage_date <= ?3",
        )?;
        let (messages, documents): (i64, i64) = stmt.query_row(
            duckdb::params![tenant.as_str(), from.to_string(), through.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(ActionCounts {
            messages: messages.max(0) as u64,
            documents: documents.max(0) as u64,
        })
    }

    async fn increment_daily(
        &self,
        tenant: &TenantId,
        kind: ActionKind,
        now: DateTime<Utc>,
    ) -> Result<()> {
        // A document travels as a message, so it bumps both counters.
        let (message_inc, document_inc): (i64, i64) = match kind {
            ActionKind::Message => (1, 0),
            ActionKind::Document => (1, 1),
        };
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO daily_usage (tenant_id, usage_date, message_count, document_count, last_activity) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT (tenant_id, usage_date) DO UPDATE SET \
                 message_count = daily_usage.message_count + EXCLUDED.message_count, \
                 document_count = daily_usage.document_count + EXCLUDED.document_count, \
                 last_activity = EXCLUDED.last_activity",
            duckdb::params![
                tenant.as_str(),
                now.date_naive().to_string(),
                message_inc,
                document_inc,
                fmt_ts(now),
            ],
        )?;
        Ok(())
    }

    async fn claim_action(
        &self,
        tenant: &TenantId,
        action_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.conn.lock().await;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO recorded_actions (action_id, tenant_id, recorded_at) \
             VALUES (?1, ?2, ?3)",
            duckdb::params![action_id, tenant.as_str(), fmt_ts(now)],
        )?;
        Ok(inserted > 0)
    }

    async fn reset_daily(&self, tenant: &TenantId, date: NaiveDate) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE daily_usage SET message_count = 0, document_count = 0 \
             WHERE tenant_id = ?1 AND usage_date = ?2",
            duckdb::params![tenant.as_str(), date.to_string()],
        )?;
        Ok(())
    }

    async fn purge_tenant(&self, tenant: &TenantId) -> Result<u64> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute(
            "DELETE FROM daily_usage WHERE tenant_id = ?1",
            duckdb::params![tenant.as_str()],
        )?;
        Ok(deleted as u64)
    }

    async fn sweep_usage_before(&self, cutoff: NaiveDate) -> Result<u64> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute(
            "DELETE FROM daily_usage WHERE usage_date < ?1",
            duckdb::params![cutoff.to_string()],
        )?;
        Ok(deleted as u64)
    }

    async fn sweep_actions_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute(
            "DELETE FROM recorded_actions WHERE recorded_at < ?1",
            duckdb::params![fmt_ts(cutoff)],
        )?;
        Ok(deleted as u64)
    }
}

/// Parse a timestamp string produced by `CAST(x AS VARCHAR)` in DuckDB.
/// The fractional part is omitted when zero; `%.f` accepts both forms.
fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")?;
    Ok(naive.and_utc())
}
