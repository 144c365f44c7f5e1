//! Membership repository for database operations

use anyhow::Result;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::{Membership, MembershipPlan, MembershipStatus};

/// Membership repository
#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the user's membership, if any
    ///
    /// One membership per user is an application convention rather than
    /// a schema constraint; if duplicates exist, the newest row wins.
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Membership>> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT * FROM memberships
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    /// Activate a membership for the purchased plan
    ///
    /// Called on payment success. Updates the existing row when the user
    /// already has one, otherwise inserts.
    pub async fn activate_for_plan(
        &self,
        user_id: Uuid,
        plan: &MembershipPlan,
    ) -> Result<Membership> {
        info!("Activating {} membership for user {}", plan.plan_type, user_id);

        let start = Utc::now();
        let end = start + Duration::days(plan.duration_days as i64);

        let existing = self.find_by_user(user_id).await?;

        let membership = match existing {
            Some(current) => {
                sqlx::query_as::<_, Membership>(
                    r#"
                    UPDATE memberships
                    SET plan_type = $2, status = $3, start_date = $4, end_date = $5,
                        updated_at = now()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(current.id)
                .bind(&plan.plan_type)
                .bind(MembershipStatus::Active.as_str())
                .bind(start)
                .bind(end)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Membership>(
                    r#"
                    INSERT INTO memberships
                        (id, user_id, plan_type, status, start_date, end_date, auto_renew)
                    VALUES ($1, $2, $3, $4, $5, $6, false)
                    RETURNING *
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(user_id)
                .bind(&plan.plan_type)
                .bind(MembershipStatus::Active.as_str())
                .bind(start)
                .bind(end)
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(membership)
    }
}
