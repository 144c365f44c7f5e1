//! Punch card repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{NewPunchCard, PunchCard, PunchCardStatus, PunchCardTemplate};

/// Failure modes of the consume-one-visit operation
#[derive(Error, Debug)]
pub enum ConsumeError {
    #[error("punch card not found")]
    NotFound,

    #[error("no remaining punches")]
    NoRemainingPunches,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Punch card repository
#[derive(Clone)]
pub struct PunchCardRepository {
    pool: PgPool,
}

impl PunchCardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a user's punch cards, oldest purchase first
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<PunchCard>> {
        let cards = sqlx::query_as::<_, PunchCard>(
            r#"
            SELECT * FROM punch_cards
            WHERE user_id = $1
            ORDER BY purchased_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    /// Find a punch card by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PunchCard>> {
        let card = sqlx::query_as::<_, PunchCard>("SELECT * FROM punch_cards WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(card)
    }

    /// Create a punch card for a user
    pub async fn create(&self, user_id: Uuid, payload: &NewPunchCard) -> Result<PunchCard> {
        info!("Creating punch card '{}' for user {}", payload.name, user_id);

        let card = sqlx::query_as::<_, PunchCard>(
            r#"
            INSERT INTO punch_cards
                (id, user_id, name, total_punches, remaining_punches,
                 price_per_punch_cents, total_price_cents, status)
            VALUES ($1, $2, $3, $4, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&payload.name)
        .bind(payload.total_punches)
        .bind(payload.price_per_punch_cents)
        .bind(payload.total_price_cents)
        .bind(PunchCardStatus::Active.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(card)
    }

    /// Create a punch card from a purchased template
    pub async fn create_from_template(
        &self,
        user_id: Uuid,
        template: &PunchCardTemplate,
    ) -> Result<PunchCard> {
        let price_per_punch = if template.punches > 0 {
            template.price_cents / template.punches as i64
        } else {
            0
        };

        self.create(
            user_id,
            &NewPunchCard {
                name: template.name.clone(),
                total_punches: template.punches,
                price_per_punch_cents: price_per_punch,
                total_price_cents: template.price_cents,
            },
        )
        .await
    }

    /// Consume exactly one visit from a punch card
    ///
    /// This is the only operation that mutates a balance. The decrement
    /// is a single conditional UPDATE so concurrent consumers can never
    /// drive `remaining_punches` below zero; losing the race reports
    /// `NoRemainingPunches`. A card that hits zero flips to `exhausted`;
    /// any other status is preserved as-is.
    pub async fn consume_one(&self, id: Uuid) -> Result<PunchCard, ConsumeError> {
        let updated = sqlx::query_as::<_, PunchCard>(
            r#"
            UPDATE punch_cards
            SET remaining_punches = remaining_punches - 1,
                status = CASE WHEN remaining_punches = 1 THEN 'exhausted' ELSE status END,
                updated_at = now()
            WHERE id = $1 AND remaining_punches > 0
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(card) => Ok(card),
            // Zero rows: either the card is gone or it has no balance.
            None => {
                let exists =
                    sqlx::query_scalar::<_, i64>("SELECT count(*) FROM punch_cards WHERE id = $1")
                        .bind(id)
                        .fetch_one(&self.pool)
                        .await?;

                if exists > 0 {
                    Err(ConsumeError::NoRemainingPunches)
                } else {
                    Err(ConsumeError::NotFound)
                }
            }
        }
    }
}
