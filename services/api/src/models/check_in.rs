//! Check-in event model
//!
//! Check-ins are append-only. `membership_ref` carries the user's
//! membership id when they have one; the synthetic `day-pass-{cardId}`
//! marker is used only when a punch card paid for the visit and no
//! membership row exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// How the member presented at the door
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckInMethod {
    Qr,
    Manual,
}

impl CheckInMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInMethod::Qr => "qr",
            CheckInMethod::Manual => "manual",
        }
    }
}

impl FromStr for CheckInMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "qr" => Ok(CheckInMethod::Qr),
            "manual" => Ok(CheckInMethod::Manual),
            other => Err(format!("unknown check-in method: {other}")),
        }
    }
}

/// Check-in event entity
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub id: Uuid,
    pub user_id: Uuid,
    pub membership_ref: String,
    pub location: Option<String>,
    pub method: String,
    pub checked_in_at: DateTime<Utc>,
}

/// New check-in payload, built by the check-in resolver
#[derive(Debug, Clone)]
pub struct NewCheckIn {
    pub user_id: Uuid,
    pub membership_ref: String,
    pub location: Option<String>,
    pub method: CheckInMethod,
}

impl NewCheckIn {
    /// Synthetic membership reference for day-pass funded visits by
    /// users without a membership row.
    pub fn day_pass_ref(card_id: Uuid) -> String {
        format!("day-pass-{card_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_pass_ref_format() {
        let id = Uuid::new_v4();
        assert_eq!(NewCheckIn::day_pass_ref(id), format!("day-pass-{id}"));
    }

    #[test]
    fn method_round_trips_through_str() {
        for method in [CheckInMethod::Qr, CheckInMethod::Manual] {
            assert_eq!(CheckInMethod::from_str(method.as_str()), Ok(method));
        }
    }
}
