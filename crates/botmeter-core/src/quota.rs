//! Plan-quota evaluation, pure over already-loaded counters.

use crate::admission::{DenyReason, RemainingQuota};
use crate::policy::PlanCeilings;
use crate::tenant::ActionKind;
use crate::usage::ActionCounts;

/// Check `kind` against the daily then monthly ceiling.
///
/// Daily is checked first: a tenant exhausted on both is reported as
/// daily-limited, the sooner-resolving constraint. On success the
/// remaining headroom covers the checked kind only.
pub fn check_quota(
    today: ActionCounts,
    month: ActionCounts,
    ceilings: &PlanCeilings,
    kind: ActionKind,
) -> Result<RemainingQuota, DenyReason> {
    let (used_today, used_month, daily_cap, monthly_cap) = match kind {
        ActionKind::Message => (
            today.messages,
            month.messages,
            ceilings.daily_messages,
            ceilings.monthly_messages,
        ),
        ActionKind::Document => (
            today.documents,
            month.documents,
            ceilings.daily_documents,
            ceilings.monthly_documents,
        ),
    };

    if used_today >= daily_cap {
        return Err(DenyReason::DailyLimit);
    }
    if used_month >= monthly_cap {
        return Err(DenyReason::MonthlyLimit);
    }

    Ok(RemainingQuota {
        daily: daily_cap - used_today,
        monthly: monthly_cap - used_month,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ceilings() -> PlanCeilings {
        PlanCeilings {
            daily_messages: 10,
            monthly_messages: 100,
            daily_documents: 3,
            monthly_documents: 20,
        }
    }

    fn counts(messages: u64, documents: u64) -> ActionCounts {
        ActionCounts {
            messages,
            documents,
        }
    }

    #[test]
    fn under_both_ceilings_reports_remaining() {
        let remaining = check_quota(counts(4, 0), counts(40, 0), &ceilings(), ActionKind::Message);
        assert_eq!(remaining, Ok(RemainingQuota { daily: 6, monthly: 60 }));
    }

    #[test]
    fn daily_ceiling_denies_at_boundary() {
        let result = check_quota(counts(10, 0), counts(10, 0), &ceilings(), ActionKind::Message);
        assert_eq!(result, Err(DenyReason::DailyLimit));
    }

    #[test]
    fn monthly_ceiling_denies_when_daily_has_room() {
        let result = check_quota(counts(0, 0), counts(100, 0), &ceilings(), ActionKind::Message);
        assert_eq!(result, Err(DenyReason::MonthlyLimit));
    }

    #[test]
    fn daily_reported_before_monthly_when_both_exhausted() {
        let result = check_quota(
            counts(10, 0),
            counts(100, 0),
            &ceilings(),
            ActionKind::Message,
        );
        assert_eq!(result, Err(DenyReason::DailyLimit));
    }

    #[test]
    fn document_kind_checks_document_ceilings_only() {
        // Message counters exhausted; document headroom untouched.
        let result = check_quota(
            counts(10, 1),
            counts(100, 5),
            &ceilings(),
            ActionKind::Document,
        );
        assert_eq!(result, Ok(RemainingQuota { daily: 2, monthly: 15 }));
    }
}
