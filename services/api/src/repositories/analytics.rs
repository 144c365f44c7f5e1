//! Aggregate queries for the admin dashboard

use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;

/// Dashboard summary figures
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_members: i64,
    pub active_memberships: i64,
    pub check_ins_today: i64,
    pub revenue_cents: i64,
}

/// Analytics repository
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Compute the dashboard summary
    pub async fn summary(&self) -> Result<AnalyticsSummary> {
        let total_members =
            sqlx::query_scalar::<_, i64>("SELECT count(*) FROM users WHERE role = 'member'")
                .fetch_one(&self.pool)
                .await?;

        let active_memberships =
            sqlx::query_scalar::<_, i64>("SELECT count(*) FROM memberships WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;

        let check_ins_today = sqlx::query_scalar::<_, i64>(
            "SELECT count(*) FROM check_ins WHERE checked_in_at >= date_trunc('day', now())",
        )
        .fetch_one(&self.pool)
        .await?;

        let revenue_cents = sqlx::query_scalar::<_, i64>(
            "SELECT coalesce(sum(amount_cents), 0) FROM payments WHERE status = 'succeeded'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AnalyticsSummary {
            total_members,
            active_memberships,
            check_ins_today,
            revenue_cents,
        })
    }
}
