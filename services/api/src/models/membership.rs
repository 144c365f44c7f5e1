//! Membership and membership plan models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Plan tier of a membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Basic,
    Premium,
    Vip,
    Daily,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Basic => "basic",
            PlanType::Premium => "premium",
            PlanType::Vip => "vip",
            PlanType::Daily => "daily",
        }
    }
}

impl FromStr for PlanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(PlanType::Basic),
            "premium" => Ok(PlanType::Premium),
            "vip" => Ok(PlanType::Vip),
            "daily" => Ok(PlanType::Daily),
            other => Err(format!("unknown plan type: {other}")),
        }
    }
}

/// Status of a membership
///
/// Transitions are externally driven: payment success activates a
/// membership, and admin tooling may freeze or expire one. No automatic
/// expiry sweep runs in this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Inactive,
    Expired,
    Frozen,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Inactive => "inactive",
            MembershipStatus::Expired => "expired",
            MembershipStatus::Frozen => "frozen",
        }
    }
}

impl FromStr for MembershipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MembershipStatus::Active),
            "inactive" => Ok(MembershipStatus::Inactive),
            "expired" => Ok(MembershipStatus::Expired),
            "frozen" => Ok(MembershipStatus::Frozen),
            other => Err(format!("unknown membership status: {other}")),
        }
    }
}

/// Membership entity
///
/// One active membership per user by application convention; the schema
/// does not enforce it.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_type: String,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn status(&self) -> MembershipStatus {
        MembershipStatus::from_str(&self.status).unwrap_or(MembershipStatus::Inactive)
    }

    pub fn is_active(&self) -> bool {
        self.status() == MembershipStatus::Active
    }
}

/// Membership plan offering, managed by admins
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlan {
    pub id: Uuid,
    pub name: String,
    pub plan_type: String,
    pub price_cents: i64,
    pub duration_days: i32,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Plan creation / update payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPayload {
    pub name: String,
    pub plan_type: PlanType,
    pub price_cents: i64,
    pub duration_days: i32,
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_active_only_for_active_status() {
        let mut membership = Membership {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan_type: "premium".to_string(),
            status: "active".to_string(),
            start_date: Utc::now(),
            end_date: Utc::now(),
            auto_renew: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(membership.is_active());

        for status in ["inactive", "expired", "frozen", "garbage"] {
            membership.status = status.to_string();
            assert!(!membership.is_active(), "{status} should not be active");
        }
    }

    #[test]
    fn plan_payload_defaults_to_active() {
        let payload: PlanPayload = serde_json::from_value(serde_json::json!({
            "name": "Premium Monthly",
            "planType": "premium",
            "priceCents": 7900,
            "durationDays": 30
        }))
        .unwrap();
        assert!(payload.active);
        assert_eq!(payload.plan_type, PlanType::Premium);
    }
}
