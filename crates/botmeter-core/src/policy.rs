use serde::Serialize;

use crate::tenant::{PlanTier, SubscriptionStatus};

/// Numeric ceilings for one plan tier. All four are per-action-kind caps;
/// daily is always ≤ monthly within a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanCeilings {
    pub daily_messages: u64,
    pub monthly_messages: u64,
    pub daily_documents: u64,
    pub monthly_documents: u64,
}

/// Short-horizon request caps shared by every tier. These exist for abuse
/// prevention, not monetization, so a plan upgrade must not raise them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BurstThresholds {
    pub per_minute: u64,
    pub per_hour: u64,
}

impl Default for BurstThresholds {
    fn default() -> Self {
        Self {
            per_minute: 20,
            per_hour: 300,
        }
    }
}

/// Immutable ceiling tables, injected at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaPolicy {
    pub trial: PlanCeilings,
    pub standard: PlanCeilings,
    pub premium: PlanCeilings,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            trial: PlanCeilings {
                daily_messages: 10,
                monthly_messages: 100,
                daily_documents: 3,
                monthly_documents: 20,
            },
            standard: PlanCeilings {
                daily_messages: 100,
                monthly_messages: 2_000,
                daily_documents: 20,
                monthly_documents: 200,
            },
            premium: PlanCeilings {
                daily_messages: 500,
                monthly_messages: 10_000,
                daily_documents: 100,
                monthly_documents: 1_000,
            },
        }
    }
}

impl QuotaPolicy {
    /// Resolve concrete ceilings for a (tier, status) pair. Total: every
    /// pair maps to some ceiling set, no error path.
    ///
    /// Trial status always selects the trial ceilings regardless of tier —
    /// trials are free and must stay the cheapest to abuse, even when
    /// stale billing data still carries a paid tier value.
    pub fn ceilings(&self, tier: PlanTier, status: SubscriptionStatus) -> &PlanCeilings {
        if status == SubscriptionStatus::Trial {
            return &self.trial;
        }
        match tier {
            PlanTier::Trial => &self.trial,
            PlanTier::Standard => &self.standard,
            PlanTier::Premium => &self.premium,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_status_overrides_tier() {
        let policy = QuotaPolicy::default();
        let ceilings = policy.ceilings(PlanTier::Premium, SubscriptionStatus::Trial);
        assert_eq!(*ceilings, policy.trial);
    }

    #[test]
    fn paid_statuses_select_by_tier() {
        let policy = QuotaPolicy::default();
        for status in [
            SubscriptionStatus::Active,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Cancelled,
            SubscriptionStatus::Expired,
        ] {
            assert_eq!(*policy.ceilings(PlanTier::Standard, status), policy.standard);
            assert_eq!(*policy.ceilings(PlanTier::Premium, status), policy.premium);
        }
    }

    #[test]
    fn daily_never_exceeds_monthly() {
        let policy = QuotaPolicy::default();
        for tier in [&policy.trial, &policy.standard, &policy.premium] {
            assert!(tier.daily_messages <= tier.monthly_messages);
            assert!(tier.daily_documents <= tier.monthly_documents);
        }
    }
}
