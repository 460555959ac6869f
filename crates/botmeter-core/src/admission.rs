//! The single allow/deny decision point for inbound actions.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::burst::check_burst;
use crate::policy::{BurstThresholds, QuotaPolicy};
use crate::quota::check_quota;
use crate::tenant::{ActionKind, Subscription, TenantId};
use crate::usage::{month_start, RateWindowStore, UsageStore, WindowKind};

/// Why an action was turned away. The `Display` strings are the fixed
/// vocabulary callers surface directly to the end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    NoSubscription,
    SubscriptionInactive,
    DailyLimit,
    MonthlyLimit,
    PerMinuteRate,
    PerHourRate,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NoSubscription => "no active subscription",
            Self::SubscriptionInactive => "subscription inactive",
            Self::DailyLimit => "daily limit",
            Self::MonthlyLimit => "monthly limit",
            Self::PerMinuteRate => "rate limit: per-minute",
            Self::PerHourRate => "rate limit: per-hour",
        };
        f.write_str(msg)
    }
}

/// Headroom left under the daily and monthly ceilings of the checked
/// action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemainingQuota {
    pub daily: u64,
    pub monthly: u64,
}

/// The combined verdict for a prospective action. A denial is a normal
/// return value, not an error — it happens routinely under correct
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdmissionVerdict {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<RemainingQuota>,
}

impl AdmissionVerdict {
    pub fn allow(remaining: RemainingQuota) -> Self {
        Self {
            allowed: true,
            reason: None,
            remaining: Some(remaining),
        }
    }

    pub fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            remaining: None,
        }
    }
}

/// Outcome of a recording call carrying an idempotency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    Recorded,
    /// The action id was seen before; no counter was touched.
    Duplicate,
}

/// Orchestrates subscription gate → quota evaluator → burst limiter into
/// one verdict, and owns the post-action recording path.
pub struct AdmissionService {
    policy: QuotaPolicy,
    thresholds: BurstThresholds,
    usage: Arc<dyn UsageStore>,
    windows: Arc<dyn RateWindowStore>,
}

impl AdmissionService {
    pub fn new(
        policy: QuotaPolicy,
        thresholds: BurstThresholds,
        usage: Arc<dyn UsageStore>,
        windows: Arc<dyn RateWindowStore>,
    ) -> Self {
        Self {
            policy,
            thresholds,
            usage,
            windows,
        }
    }

    /// Decide whether `tenant` may perform `kind` right now.
    ///
    /// Checks run in a fixed order and short-circuit on the first denial:
    /// subscription presence, subscription activity, daily/monthly quota,
    /// per-minute/per-hour burst. Inactive tenants never reach the store
    /// layer. An `Err` is an infrastructure failure (store unreachable),
    /// never a denial; the recommended caller policy is to fail closed.
    ///
    /// This performs no writes — repeated calls without an intervening
    /// [`record_usage`](Self::record_usage) return the same verdict.
    pub async fn can_act(
        &self,
        tenant: &TenantId,
        subscription: Option<&Subscription>,
        kind: ActionKind,
        now: DateTime<Utc>,
    ) -> Result<AdmissionVerdict> {
        let Some(sub) = subscription else {
            debug!(%tenant, "admission denied: no subscription");
            return Ok(AdmissionVerdict::deny(DenyReason::NoSubscription));
        };
        if !sub.status.is_active() {
            debug!(%tenant, status = ?sub.status, "admission denied: inactive");
            return Ok(AdmissionVerdict::deny(DenyReason::SubscriptionInactive));
        }

        let remaining = match self.evaluate_quota(tenant, sub, kind, now).await? {
            Ok(remaining) => remaining,
            Err(reason) => {
                debug!(%tenant, ?kind, %reason, "admission denied by quota");
                return Ok(AdmissionVerdict::deny(reason));
            }
        };

        if let Err(reason) = self.evaluate_burst(tenant, now).await? {
            debug!(%tenant, %reason, "admission denied by burst limiter");
            return Ok(AdmissionVerdict::deny(reason));
        }

        Ok(AdmissionVerdict::allow(remaining))
    }

    /// Load today's row and the month-to-date sums, then run the pure
    /// quota check against the tenant's resolved ceilings.
    pub async fn evaluate_quota(
        &self,
        tenant: &TenantId,
        subscription: &Subscription,
        kind: ActionKind,
        now: DateTime<Utc>,
    ) -> Result<std::result::Result<RemainingQuota, DenyReason>> {
        let ceilings = self.policy.ceilings(subscription.tier, subscription.status);
        let today = now.date_naive();
        let day_counts = self
            .usage
            .daily_usage(tenant, today)
            .await?
            .map(|row| row.counts)
            .unwrap_or_default();
        let month_counts = self
            .usage
            .month_usage(tenant, month_start(today), today)
            .await?;
        Ok(check_quota(day_counts, month_counts, ceilings, kind))
    }

    /// Load the current minute/hour window counts and run the pure burst
    /// check. Plan-independent.
    pub async fn evaluate_burst(
        &self,
        tenant: &TenantId,
        now: DateTime<Utc>,
    ) -> Result<std::result::Result<(), DenyReason>> {
        let minute = self
            .windows
            .window_count(tenant, WindowKind::Minute, WindowKind::Minute.truncate(now))
            .await?;
        let hour = self
            .windows
            .window_count(tenant, WindowKind::Hour, WindowKind::Hour.truncate(now))
            .await?;
        Ok(check_burst(minute, hour, &self.thresholds))
    }

    /// Record that an action actually happened.
    ///
    /// Does not re-check admission: callers run [`can_act`](Self::can_act)
    /// first and record only after the action went through, so denied
    /// actions never inflate counters. `action_id` (e.g. the message id)
    /// deduplicates retries — a replay returns
    /// [`RecordOutcome::Duplicate`] and touches nothing.
    ///
    /// A document action also bumps the message counters, since document
    /// processing is itself transported as a message.
    pub async fn record_usage(
        &self,
        tenant: &TenantId,
        kind: ActionKind,
        action_id: &str,
        now: DateTime<Utc>,
    ) -> Result<RecordOutcome> {
        if !self.usage.claim_action(tenant, action_id, now).await? {
            debug!(%tenant, action_id, "duplicate recording ignored");
            return Ok(RecordOutcome::Duplicate);
        }
        self.usage.increment_daily(tenant, kind, now).await?;
        self.windows.increment_windows(tenant, now).await?;
        Ok(RecordOutcome::Recorded)
    }

    /// Administrative: zero today's usage counters for the tenant.
    /// Destructive and immediate; authorization is the caller's job.
    pub async fn reset_daily(&self, tenant: &TenantId, now: DateTime<Utc>) -> Result<()> {
        self.usage.reset_daily(tenant, now.date_naive()).await
    }

    /// Administrative: drop all burst-window state for the tenant.
    pub async fn reset_burst(&self, tenant: &TenantId) -> Result<u64> {
        self.windows.purge_tenant(tenant).await
    }

    /// Administrative: delete every usage and window row for the tenant.
    pub async fn reset_tenant(&self, tenant: &TenantId) -> Result<()> {
        self.usage.purge_tenant(tenant).await?;
        self.windows.purge_tenant(tenant).await?;
        Ok(())
    }

    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }
}
