//! Cookie session management backed by Redis
//!
//! A login creates an opaque random token stored under
//! `session:{token}` with the user id as the value and a TTL. The token
//! travels in the `session` cookie; nothing about the user is encoded
//! in it.

use anyhow::Result;
use rand::RngCore;
use tracing::info;
use uuid::Uuid;

use common::cache::RedisPool;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session lifetime in seconds
    pub ttl_seconds: u64,
}

impl SessionConfig {
    /// Create a new SessionConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SESSION_TTL_SECONDS`: session lifetime (default: 86400, one day)
    pub fn from_env() -> Result<Self> {
        let ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .unwrap_or(86400);

        Ok(SessionConfig { ttl_seconds })
    }
}

/// Session manager for handling login sessions in Redis
#[derive(Clone)]
pub struct SessionManager {
    redis_pool: RedisPool,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(redis_pool: RedisPool, config: SessionConfig) -> Self {
        Self { redis_pool, config }
    }

    fn session_key(token: &str) -> String {
        format!("session:{token}")
    }

    /// Create a new session for a user, returning the opaque token.
    pub async fn create_session(&self, user_id: Uuid) -> Result<String> {
        info!("Creating session for user: {}", user_id);

        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = bytes.iter().map(|b| format!("{b:02x}")).collect::<String>();

        self.redis_pool
            .set(
                &Self::session_key(&token),
                &user_id.to_string(),
                Some(self.config.ttl_seconds),
            )
            .await?;

        Ok(token)
    }

    /// Resolve a session token to its user id, if the session is live.
    pub async fn resolve(&self, token: &str) -> Result<Option<Uuid>> {
        let value = self.redis_pool.get(&Self::session_key(token)).await?;

        Ok(value.and_then(|v| Uuid::parse_str(&v).ok()))
    }

    /// Destroy a session.
    pub async fn destroy(&self, token: &str) -> Result<()> {
        self.redis_pool.delete(&Self::session_key(token)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn session_config_defaults_to_one_day() {
        unsafe {
            std::env::remove_var("SESSION_TTL_SECONDS");
        }
        let config = SessionConfig::from_env().unwrap();
        assert_eq!(config.ttl_seconds, 86400);
    }

    #[test]
    #[serial]
    fn session_config_reads_env() {
        unsafe {
            std::env::set_var("SESSION_TTL_SECONDS", "3600");
        }
        let config = SessionConfig::from_env().unwrap();
        assert_eq!(config.ttl_seconds, 3600);
        unsafe {
            std::env::remove_var("SESSION_TTL_SECONDS");
        }
    }

    #[test]
    fn session_key_is_namespaced() {
        assert_eq!(SessionManager::session_key("abc"), "session:abc");
    }
}
