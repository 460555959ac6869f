use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Identifier of the account whose usage is being metered.
///
/// Resolving a raw credential into this identifier is the transport
/// layer's job; the core only validates its shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.len() > 64 {
            return Err(CoreError::InvalidTenantId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two meterable operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// A chat turn.
    Message,
    /// A receipt/file submission. Transported as a message, so recording
    /// a document also counts against the message counters.
    Document,
}

impl ActionKind {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim() {
            "message" => Ok(Self::Message),
            "document" => Ok(Self::Document),
            other => Err(CoreError::UnknownActionKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Trial,
    Standard,
    Premium,
}

impl PlanTier {
    /// Map a raw tier string to a tier, defaulting unrecognized/legacy
    /// values to `Standard`. Fail-open is a recorded policy choice:
    /// billing-data skew should not zero out a paying tenant, and trial
    /// ceilings are selected by status, never by tier.
    pub fn from_str_lossy(raw: &str) -> Self {
        match raw.trim() {
            "trial" => Self::Trial,
            "premium" => Self::Premium,
            _ => Self::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    PastDue,
    Cancelled,
    Expired,
}

impl SubscriptionStatus {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim() {
            "trial" => Ok(Self::Trial),
            "active" => Ok(Self::Active),
            "past_due" => Ok(Self::PastDue),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            other => Err(CoreError::UnknownSubscriptionStatus(other.to_string())),
        }
    }

    /// Cancelled and expired tenants are turned away before any counter
    /// is read; past-due tenants keep acting while billing catches up.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Trial | Self::Active | Self::PastDue)
    }
}

/// Current plan state for a tenant, supplied per call by the billing
/// collaborator. Never mutated by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub tier: PlanTier,
    pub status: SubscriptionStatus,
}
