//! Punch card and punch card template models
//!
//! A punch card is a prepaid bundle of facility visits. The balance is
//! only ever changed by the consume-one-visit operation in the punch
//! card repository; there is no add-punches or refund path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Status of a punch card
///
/// `Exhausted` is set exactly when the last punch is consumed and is
/// terminal. `Expired` is representable for externally-managed data but
/// never assigned by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PunchCardStatus {
    Active,
    Expired,
    Exhausted,
}

impl PunchCardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PunchCardStatus::Active => "active",
            PunchCardStatus::Expired => "expired",
            PunchCardStatus::Exhausted => "exhausted",
        }
    }
}

impl FromStr for PunchCardStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PunchCardStatus::Active),
            "expired" => Ok(PunchCardStatus::Expired),
            "exhausted" => Ok(PunchCardStatus::Exhausted),
            other => Err(format!("unknown punch card status: {other}")),
        }
    }
}

/// Punch card entity
///
/// Invariant: `0 <= remaining_punches <= total_punches`.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PunchCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub total_punches: i32,
    pub remaining_punches: i32,
    pub price_per_punch_cents: i64,
    pub total_price_cents: i64,
    pub status: String,
    pub purchased_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PunchCard {
    pub fn status(&self) -> PunchCardStatus {
        PunchCardStatus::from_str(&self.status).unwrap_or(PunchCardStatus::Exhausted)
    }

    /// A card can fund a check-in only while active with punches left.
    pub fn is_usable(&self) -> bool {
        self.status() == PunchCardStatus::Active && self.remaining_punches > 0
    }
}

/// New punch card creation payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPunchCard {
    pub name: String,
    pub total_punches: i32,
    pub price_per_punch_cents: i64,
    pub total_price_cents: i64,
}

/// Punch card offering template, managed by admins
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PunchCardTemplate {
    pub id: Uuid,
    pub name: String,
    pub punches: i32,
    pub price_cents: i64,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Template creation / update payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePayload {
    pub name: String,
    pub punches: i32,
    pub price_cents: i64,
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

    fn card(status: &str, remaining: i32) -> PunchCard {
        PunchCard {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "10 Visits".to_string(),
            total_punches: 10,
            remaining_punches: remaining,
            price_per_punch_cents: 1500,
            total_price_cents: 15000,
            status: status.to_string(),
            purchased_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn usable_requires_active_status_and_balance() {
        assert!(card("active", 3).is_usable());
        assert!(!card("active", 0).is_usable());
        assert!(!card("exhausted", 0).is_usable());
        assert!(!card("expired", 3).is_usable());
        assert!(!card("frozen", 3).is_usable());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(card("active", 3)).unwrap();
        assert_eq!(json["remainingPunches"], 3);
        assert_eq!(json["totalPunches"], 10);
        assert_eq!(json["status"], "active");
    }
}
