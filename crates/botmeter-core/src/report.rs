//! Display-ready usage/limits snapshots for tenant and operator surfaces.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::policy::{PlanCeilings, QuotaPolicy};
use crate::tenant::{PlanTier, Subscription, TenantId};
use crate::usage::{month_start, UsageStore};

/// The four counters of a quota period, one value per ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageQuad {
    pub daily_messages: u64,
    pub monthly_messages: u64,
    pub daily_documents: u64,
    pub monthly_documents: u64,
}

/// Read-only snapshot combining resolved ceilings with current usage.
/// Shape is stable: plan name, four ceilings, four matching usage
/// counters, four remaining-headroom values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitsSnapshot {
    pub plan: PlanTier,
    pub limits: PlanCeilings,
    pub usage: UsageQuad,
    pub remaining: UsageQuad,
}

/// Which ceiling pushed a tenant over the alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingKind {
    DailyMessages,
    MonthlyMessages,
    DailyDocuments,
    MonthlyDocuments,
}

impl fmt::Display for CeilingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DailyMessages => "daily messages",
            Self::MonthlyMessages => "monthly messages",
            Self::DailyDocuments => "daily documents",
            Self::MonthlyDocuments => "monthly documents",
        };
        f.write_str(name)
    }
}

/// One tenant flagged by the bulk near-limit scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearLimitEntry {
    pub tenant: TenantId,
    pub plan: PlanTier,
    pub ceiling: CeilingKind,
    /// Percent of the worst ceiling consumed, 0.0–100.0 and beyond.
    pub percent_used: f64,
}

/// Read-heavy fan-out over the same per-tenant primitives the admission
/// path uses. Consumes the usage store only; subscriptions come from the
/// billing collaborator per call.
pub struct UsageReporter {
    policy: QuotaPolicy,
    usage: Arc<dyn UsageStore>,
    /// Percent-of-ceiling at which the bulk scan flags a tenant.
    near_limit_percent: f64,
}

impl UsageReporter {
    pub fn new(policy: QuotaPolicy, usage: Arc<dyn UsageStore>, near_limit_percent: f64) -> Self {
        Self {
            policy,
            usage,
            near_limit_percent,
        }
    }

    /// Snapshot for one tenant, or `None` when the tenant has no
    /// subscription (the caller signals "not found" — never a zero-filled
    /// snapshot).
    pub async fn limits_snapshot(
        &self,
        tenant: &TenantId,
        subscription: Option<&Subscription>,
        now: DateTime<Utc>,
    ) -> Result<Option<LimitsSnapshot>> {
        let Some(sub) = subscription else {
            return Ok(None);
        };

        let limits = *self.policy.ceilings(sub.tier, sub.status);
        let usage = self.load_usage_quad(tenant, now).await?;
        let remaining = UsageQuad {
            daily_messages: limits.daily_messages.saturating_sub(usage.daily_messages),
            monthly_messages: limits
                .monthly_messages
                .saturating_sub(usage.monthly_messages),
            daily_documents: limits.daily_documents.saturating_sub(usage.daily_documents),
            monthly_documents: limits
                .monthly_documents
                .saturating_sub(usage.monthly_documents),
        };

        Ok(Some(LimitsSnapshot {
            plan: sub.tier,
            limits,
            usage,
            remaining,
        }))
    }

    /// Scan a roster of tenants and flag any whose worst percent-of-ceiling
    /// meets the alert threshold. Non-active statuses are skipped (there is
    /// nothing actionable about a cancelled tenant's usage).
    pub async fn near_limit_report(
        &self,
        roster: &[(TenantId, Subscription)],
        now: DateTime<Utc>,
    ) -> Result<Vec<NearLimitEntry>> {
        let mut flagged = Vec::new();
        for (tenant, sub) in roster {
            if !sub.status.is_active() {
                continue;
            }
            let limits = self.policy.ceilings(sub.tier, sub.status);
            let usage = self.load_usage_quad(tenant, now).await?;

            let candidates = [
                (CeilingKind::DailyMessages, usage.daily_messages, limits.daily_messages),
                (
                    CeilingKind::MonthlyMessages,
                    usage.monthly_messages,
                    limits.monthly_messages,
                ),
                (
                    CeilingKind::DailyDocuments,
                    usage.daily_documents,
                    limits.daily_documents,
                ),
                (
                    CeilingKind::MonthlyDocuments,
                    usage.monthly_documents,
                    limits.monthly_documents,
                ),
            ];

            let worst = candidates
                .into_iter()
                .filter(|(_, _, limit)| *limit > 0)
                .map(|(kind, used, limit)| (kind, used as f64 / limit as f64 * 100.0))
                .fold(None::<(CeilingKind, f64)>, |acc, next| match acc {
                    Some(best) if best.1 >= next.1 => Some(best),
                    _ => Some(next),
                });

            if let Some((ceiling, percent_used)) = worst {
                if percent_used >= self.near_limit_percent {
                    warn!(%tenant, %ceiling, percent_used, "tenant near quota ceiling");
                    flagged.push(NearLimitEntry {
                        tenant: tenant.clone(),
                        plan: sub.tier,
                        ceiling,
                        percent_used,
                    });
                }
            }
        }
        Ok(flagged)
    }

    async fn load_usage_quad(&self, tenant: &TenantId, now: DateTime<Utc>) -> Result<UsageQuad> {
        let today = now.date_naive();
        let day = self
            .usage
            .daily_usage(tenant, today)
            .await?
            .map(|row| row.counts)
            .unwrap_or_default();
        let month = self
            .usage
            .month_usage(tenant, month_start(today), today)
            .await?;
        Ok(UsageQuad {
            daily_messages: day.messages,
            monthly_messages: month.messages,
            daily_documents: day.documents,
            monthly_documents: month.documents,
        })
    }
}
