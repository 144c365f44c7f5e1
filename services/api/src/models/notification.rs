//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Notification entity
///
/// A null `user_id` means a broadcast visible to every member. `read`
/// is computed for the viewing member from their own read marker, so
/// two members can see the same broadcast in different read states.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification creation payload (admin only)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    /// Target user, or null for a broadcast
    pub user_id: Option<Uuid>,
    pub title: String,
    pub body: String,
}
