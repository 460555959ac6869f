use thiserror::Error;

/// Input validation failures, rejected before any store access.
///
/// Deliberately distinct from a quota denial: a caller that sees one of
/// these has a bug (or corrupted identity data), not an exhausted quota.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("tenant id must be 1-64 characters")]
    InvalidTenantId,
    #[error("unknown action kind: {0}")]
    UnknownActionKind(String),
    #[error("unknown subscription status: {0}")]
    UnknownSubscriptionStatus(String),
}
