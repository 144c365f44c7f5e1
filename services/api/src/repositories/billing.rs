//! Payment and payment method repositories

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::billing::{NewPayment, NewPaymentMethod, Payment, PaymentMethod, PaymentStatus};

/// Payment repository
#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a pending payment
    pub async fn create_pending(&self, new_payment: &NewPayment) -> Result<Payment> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments
                (id, user_id, amount_cents, currency, status, provider_intent_id,
                 purpose, reference_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_payment.user_id)
        .bind(new_payment.amount_cents)
        .bind(&new_payment.currency)
        .bind(PaymentStatus::Pending.as_str())
        .bind(&new_payment.provider_intent_id)
        .bind(new_payment.purpose.as_str())
        .bind(new_payment.reference_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Find a payment by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    /// Move a payment to a terminal status; returns None if it does not exist
    pub async fn set_status(&self, id: Uuid, status: PaymentStatus) -> Result<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// List a user's payments, newest first
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}

/// Payment method repository
#[derive(Clone)]
pub struct PaymentMethodRepository {
    pool: PgPool,
}

impl PaymentMethodRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a user's stored payment methods
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<PaymentMethod>> {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            r#"
            SELECT * FROM payment_methods
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(methods)
    }

    /// Find a payment method by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentMethod>> {
        let method =
            sqlx::query_as::<_, PaymentMethod>("SELECT * FROM payment_methods WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(method)
    }

    /// Store a payment method for a user
    pub async fn create(
        &self,
        user_id: Uuid,
        payload: &NewPaymentMethod,
    ) -> Result<PaymentMethod> {
        if payload.is_default {
            sqlx::query("UPDATE payment_methods SET is_default = false WHERE user_id = $1")
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        }

        let method = sqlx::query_as::<_, PaymentMethod>(
            r#"
            INSERT INTO payment_methods
                (id, user_id, provider_method_id, brand, last4, is_default)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&payload.provider_method_id)
        .bind(&payload.brand)
        .bind(&payload.last4)
        .bind(payload.is_default)
        .fetch_one(&self.pool)
        .await?;

        Ok(method)
    }

    /// Delete a payment method; returns whether a row was removed
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM payment_methods WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
