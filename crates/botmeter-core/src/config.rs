use crate::policy::{BurstThresholds, QuotaPolicy};

/// How long counter rows may live before the retention sweeper removes
/// them. Windows and the idempotency ledger share the short horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retention {
    pub window_horizon_hours: u32,
    pub usage_horizon_days: u32,
}

impl Default for Retention {
    fn default() -> Self {
        Self {
            window_horizon_hours: 2,
            usage_horizon_days: 365,
        }
    }
}

/// Immutable engine configuration, read once at startup. Ceiling tables
/// and thresholds live here instead of module-level statics so they are
/// injected, never runtime-mutable.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub duckdb_memory_limit: String,
    pub policy: QuotaPolicy,
    pub burst: BurstThresholds,
    pub retention: Retention,
    /// Percent-of-ceiling at which the operator scan flags a tenant.
    pub near_limit_percent: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let burst_default = BurstThresholds::default();
        let retention_default = Retention::default();
        Ok(Self {
            db_path: std::env::var("BOTMETER_DB_PATH")
                .unwrap_or_else(|_| "./data/botmeter.duckdb".to_string()),
            duckdb_memory_limit: std::env::var("BOTMETER_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "512MB".to_string()),
            policy: QuotaPolicy::default(),
            burst: BurstThresholds {
                per_minute: std::env::var("BOTMETER_BURST_PER_MINUTE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(burst_default.per_minute),
                per_hour: std::env::var("BOTMETER_BURST_PER_HOUR")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(burst_default.per_hour),
            },
            retention: Retention {
                window_horizon_hours: std::env::var("BOTMETER_WINDOW_RETENTION_HOURS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(retention_default.window_horizon_hours),
                usage_horizon_days: std::env::var("BOTMETER_USAGE_RETENTION_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(retention_default.usage_horizon_days),
            },
            near_limit_percent: std::env::var("BOTMETER_NEAR_LIMIT_PERCENT")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| *v > 0.0 && *v <= 100.0)
                .unwrap_or(80.0),
        })
    }
}
