//! Check-in repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CheckIn, NewCheckIn};

/// Check-in repository; check-ins are append-only
#[derive(Clone)]
pub struct CheckInRepository {
    pool: PgPool,
}

impl CheckInRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a check-in event
    pub async fn insert(&self, new_check_in: &NewCheckIn) -> Result<CheckIn> {
        let check_in = sqlx::query_as::<_, CheckIn>(
            r#"
            INSERT INTO check_ins (id, user_id, membership_ref, location, method)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_check_in.user_id)
        .bind(&new_check_in.membership_ref)
        .bind(&new_check_in.location)
        .bind(new_check_in.method.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(check_in)
    }

    /// List a user's check-ins, newest first
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<CheckIn>> {
        let check_ins = sqlx::query_as::<_, CheckIn>(
            r#"
            SELECT * FROM check_ins
            WHERE user_id = $1
            ORDER BY checked_in_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(check_ins)
    }
}
