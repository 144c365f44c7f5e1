//! Repositories for the admin-managed offerings: membership plans and
//! punch card templates

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::membership::{MembershipPlan, PlanPayload};
use crate::models::punch_card::{PunchCardTemplate, TemplatePayload};

/// Membership plan repository
#[derive(Clone)]
pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List plans currently offered for purchase
    pub async fn list_active(&self) -> Result<Vec<MembershipPlan>> {
        let plans = sqlx::query_as::<_, MembershipPlan>(
            "SELECT * FROM membership_plans WHERE active ORDER BY price_cents ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    /// List all plans, including retired ones (admin view)
    pub async fn list_all(&self) -> Result<Vec<MembershipPlan>> {
        let plans = sqlx::query_as::<_, MembershipPlan>(
            "SELECT * FROM membership_plans ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    /// Find a plan by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MembershipPlan>> {
        let plan =
            sqlx::query_as::<_, MembershipPlan>("SELECT * FROM membership_plans WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(plan)
    }

    /// Create a plan
    pub async fn create(&self, payload: &PlanPayload) -> Result<MembershipPlan> {
        let plan = sqlx::query_as::<_, MembershipPlan>(
            r#"
            INSERT INTO membership_plans
                (id, name, plan_type, price_cents, duration_days, description, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&payload.name)
        .bind(payload.plan_type.as_str())
        .bind(payload.price_cents)
        .bind(payload.duration_days)
        .bind(&payload.description)
        .bind(payload.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(plan)
    }

    /// Update a plan; returns None if it does not exist
    pub async fn update(&self, id: Uuid, payload: &PlanPayload) -> Result<Option<MembershipPlan>> {
        let plan = sqlx::query_as::<_, MembershipPlan>(
            r#"
            UPDATE membership_plans
            SET name = $2, plan_type = $3, price_cents = $4, duration_days = $5,
                description = $6, active = $7, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(payload.plan_type.as_str())
        .bind(payload.price_cents)
        .bind(payload.duration_days)
        .bind(&payload.description)
        .bind(payload.active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    /// Delete a plan; returns whether a row was removed
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM membership_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Punch card template repository
#[derive(Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List templates currently offered for purchase
    pub async fn list_active(&self) -> Result<Vec<PunchCardTemplate>> {
        let templates = sqlx::query_as::<_, PunchCardTemplate>(
            "SELECT * FROM punch_card_templates WHERE active ORDER BY price_cents ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    /// List all templates (admin view)
    pub async fn list_all(&self) -> Result<Vec<PunchCardTemplate>> {
        let templates = sqlx::query_as::<_, PunchCardTemplate>(
            "SELECT * FROM punch_card_templates ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    /// Find a template by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PunchCardTemplate>> {
        let template = sqlx::query_as::<_, PunchCardTemplate>(
            "SELECT * FROM punch_card_templates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    /// Create a template
    pub async fn create(&self, payload: &TemplatePayload) -> Result<PunchCardTemplate> {
        let template = sqlx::query_as::<_, PunchCardTemplate>(
            r#"
            INSERT INTO punch_card_templates
                (id, name, punches, price_cents, description, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&payload.name)
        .bind(payload.punches)
        .bind(payload.price_cents)
        .bind(&payload.description)
        .bind(payload.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(template)
    }

    /// Update a template; returns None if it does not exist
    pub async fn update(
        &self,
        id: Uuid,
        payload: &TemplatePayload,
    ) -> Result<Option<PunchCardTemplate>> {
        let template = sqlx::query_as::<_, PunchCardTemplate>(
            r#"
            UPDATE punch_card_templates
            SET name = $2, punches = $3, price_cents = $4, description = $5,
                active = $6, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(payload.punches)
        .bind(payload.price_cents)
        .bind(&payload.description)
        .bind(payload.active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    /// Delete a template; returns whether a row was removed
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM punch_card_templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
