use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod billing;
mod checkin;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod session;
mod state;
mod validation;

use crate::billing::{BillingClient, BillingConfig};
use crate::session::{SessionConfig, SessionManager};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting membership service");

    // Initialize database connection pool
    let db_config = common::database::DatabaseConfig::from_env()?;
    let pool = common::database::init_pool(&db_config).await?;

    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize Redis for sessions
    let redis_config = common::cache::RedisConfig::from_env()?;
    let redis_pool = common::cache::RedisPool::new(&redis_config).await?;

    let session_config = SessionConfig::from_env()?;
    let session_manager = SessionManager::new(redis_pool, session_config);

    // Initialize the payment provider client
    let billing_config = BillingConfig::from_env()?;
    let billing_client = BillingClient::new(billing_config);

    let app_state = AppState::new(pool, session_manager, billing_client);

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Membership service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
