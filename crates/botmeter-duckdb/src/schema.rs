/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup (idempotent).
///
/// `memory_limit` is passed at runtime from `Config.duckdb_memory_limit`
/// (env `BOTMETER_DUCKDB_MEMORY`, default `"512MB"`). An explicit limit is
/// always set — the DuckDB default (80% of system RAM) is not acceptable
/// for an embedded store. `SET threads = 2` caps the background pool for
/// single-writer use.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- SETTINGS
-- ===========================================
-- Keys stored in this table:
--   'version'    – Database schema version (for migrations)
--   'install_id' – Unique installation identifier
CREATE TABLE IF NOT EXISTS settings (
    key             VARCHAR PRIMARY KEY,
    value           VARCHAR NOT NULL
);

-- ===========================================
-- DAILY USAGE (quota source of truth)
-- ===========================================
-- One row per (tenant, calendar day), created lazily on the first action
-- of that day. Counts are monotonic; the only decrease path is the
-- administrative reset, which zeroes in place. Monthly totals are a SUM
-- over the date range, never a separate counter.
CREATE TABLE IF NOT EXISTS daily_usage (
    tenant_id       VARCHAR NOT NULL,
    usage_date      DATE NOT NULL,
    message_count   BIGINT NOT NULL DEFAULT 0,
    document_count  BIGINT NOT NULL DEFAULT 0,
    last_activity   TIMESTAMP NOT NULL,
    PRIMARY KEY (tenant_id, usage_date)
);
-- Optimised for the retention sweep (delete by age across tenants)
CREATE INDEX IF NOT EXISTS idx_daily_usage_date ON daily_usage(usage_date);

-- ===========================================
-- RATE WINDOWS (burst control)
-- ===========================================
-- window_start is always truncated to the boundary of window_kind
-- ('minute' | 'hour'), so the current-window lookup is a single equality
-- match on the primary key.
CREATE TABLE IF NOT EXISTS rate_windows (
    tenant_id       VARCHAR NOT NULL,
    window_kind     VARCHAR NOT NULL,
    window_start    TIMESTAMP NOT NULL,
    request_count   BIGINT NOT NULL DEFAULT 0,
    PRIMARY KEY (tenant_id, window_kind, window_start)
);
CREATE INDEX IF NOT EXISTS idx_rate_windows_start ON rate_windows(window_start);

-- ===========================================
-- RECORDED ACTIONS (idempotency ledger)
-- ===========================================
-- First INSERT wins; a retried recording of the same action_id is a
-- no-op. Entries share the short retention horizon with rate_windows.
CREATE TABLE IF NOT EXISTS recorded_actions (
    action_id       VARCHAR PRIMARY KEY,
    tenant_id       VARCHAR NOT NULL,
    recorded_at     TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_recorded_actions_at ON recorded_actions(recorded_at);
"#
    )
}
