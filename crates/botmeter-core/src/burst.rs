//! Burst-rate evaluation, pure over already-loaded window counters.

use crate::admission::DenyReason;
use crate::policy::BurstThresholds;

/// Check current-minute and current-hour request counts against the global
/// thresholds. Minute is checked first; independent of plan and action
/// kind by design — these caps are anti-abuse, not monetization, and must
/// not be bypassable by upgrading.
pub fn check_burst(
    minute_count: u64,
    hour_count: u64,
    thresholds: &BurstThresholds,
) -> Result<(), DenyReason> {
    if minute_count >= thresholds.per_minute {
        return Err(DenyReason::PerMinuteRate);
    }
    if hour_count >= thresholds.per_hour {
        return Err(DenyReason::PerHourRate);
    }
    Ok(())
}
