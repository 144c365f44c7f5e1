//! Notification repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Notification;
use crate::models::notification::NewNotification;

/// Notification repository
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List notifications visible to a user: targeted ones plus
    /// broadcasts. The `read` flag reflects the viewing user's own
    /// marker.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT n.id, n.user_id, n.title, n.body,
                   (r.notification_id IS NOT NULL) AS read,
                   n.created_at
            FROM notifications n
            LEFT JOIN notification_reads r
                ON r.notification_id = n.id AND r.user_id = $1
            WHERE n.user_id = $1 OR n.user_id IS NULL
            ORDER BY n.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Create a notification (targeted or broadcast)
    pub async fn create(&self, payload: &NewNotification) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, user_id, title, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, body, false AS read, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payload.user_id)
        .bind(&payload.title)
        .bind(&payload.body)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Mark a notification as read for one member; returns the updated
    /// row, or None when it does not exist or is not visible to them.
    ///
    /// Read markers live in a per-member table, so a broadcast can be
    /// marked read by one member without flipping it for everyone.
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        let visible = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT count(*) FROM notifications
            WHERE id = $1 AND (user_id = $2 OR user_id IS NULL)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        if visible == 0 {
            return Ok(None);
        }

        sqlx::query(
            r#"
            INSERT INTO notification_reads (notification_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let notification = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, title, body, true AS read, created_at
            FROM notifications
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::repositories::UserRepository;

    async fn test_pool() -> PgPool {
        let config = common::database::DatabaseConfig::from_env().unwrap();
        common::database::init_pool(&config).await.unwrap()
    }

    async fn member(pool: &PgPool) -> Uuid {
        UserRepository::new(pool.clone())
            .create(&NewUser {
                email: format!("{}@example.com", Uuid::new_v4()),
                password: "correct horse battery".to_string(),
                first_name: "Test".to_string(),
                last_name: "Member".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL"]
    async fn broadcast_read_state_is_per_member() {
        let pool = test_pool().await;
        let repo = NotificationRepository::new(pool.clone());
        let first = member(&pool).await;
        let second = member(&pool).await;

        let broadcast = repo
            .create(&NewNotification {
                user_id: None,
                title: "Holiday hours".to_string(),
                body: "Closed on Monday".to_string(),
            })
            .await
            .unwrap();

        let marked = repo.mark_read(broadcast.id, first).await.unwrap().unwrap();
        assert!(marked.read);

        let seen_by = |list: Vec<Notification>| {
            list.into_iter()
                .find(|n| n.id == broadcast.id)
                .map(|n| n.read)
        };
        assert_eq!(seen_by(repo.list_for_user(first).await.unwrap()), Some(true));
        assert_eq!(seen_by(repo.list_for_user(second).await.unwrap()), Some(false));
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL"]
    async fn mark_read_rejects_other_members_notifications() {
        let pool = test_pool().await;
        let repo = NotificationRepository::new(pool.clone());
        let owner = member(&pool).await;
        let stranger = member(&pool).await;

        let targeted = repo
            .create(&NewNotification {
                user_id: Some(owner),
                title: "Plan expiring".to_string(),
                body: "Renew soon".to_string(),
            })
            .await
            .unwrap();

        assert!(repo.mark_read(targeted.id, stranger).await.unwrap().is_none());
        assert!(repo.mark_read(targeted.id, owner).await.unwrap().is_some());
    }
}
