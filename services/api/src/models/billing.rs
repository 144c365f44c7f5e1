//! Payment and payment method models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle of a payment at the hosted provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "succeeded" => Ok(PaymentStatus::Succeeded),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// What a payment was for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPurpose {
    Membership,
    PunchCard,
}

impl PaymentPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentPurpose::Membership => "membership",
            PaymentPurpose::PunchCard => "punch_card",
        }
    }
}

impl FromStr for PaymentPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "membership" => Ok(PaymentPurpose::Membership),
            "punch_card" => Ok(PaymentPurpose::PunchCard),
            other => Err(format!("unknown payment purpose: {other}")),
        }
    }
}

/// Payment entity
///
/// `reference_id` points at the plan or template being purchased.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub provider_intent_id: Option<String>,
    pub purpose: String,
    pub reference_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn status(&self) -> PaymentStatus {
        PaymentStatus::from_str(&self.status).unwrap_or(PaymentStatus::Failed)
    }

    pub fn purpose(&self) -> Option<PaymentPurpose> {
        PaymentPurpose::from_str(&self.purpose).ok()
    }
}

/// New payment creation payload
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub provider_intent_id: Option<String>,
    pub purpose: PaymentPurpose,
    pub reference_id: Uuid,
}

/// Stored payment method entity
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_method_id: String,
    pub brand: Option<String>,
    pub last4: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Payment method creation payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPaymentMethod {
    pub provider_method_id: String,
    pub brand: Option<String>,
    pub last4: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}
