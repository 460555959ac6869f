pub mod admission;
pub mod burst;
pub mod config;
pub mod error;
pub mod policy;
pub mod quota;
pub mod report;
pub mod tenant;
pub mod usage;

pub use admission::{AdmissionService, AdmissionVerdict, DenyReason, RecordOutcome};
pub use config::{Config, Retention};
pub use error::CoreError;
pub use policy::{BurstThresholds, PlanCeilings, QuotaPolicy};
pub use report::{LimitsSnapshot, UsageReporter};
pub use tenant::{ActionKind, PlanTier, Subscription, SubscriptionStatus, TenantId};
pub use usage::{ActionCounts, DailyUsage, RateWindowStore, SweepReport, UsageStore, WindowKind};
