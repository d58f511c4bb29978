use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;

/// DDL for the `purchase_requisition` table and its listing index.
pub const SCHEMA: &str = include_str!("schema.sql");

pub async fn init_pool(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.database_url)
        .await?;
    log::info!("Connected to database (max_connections={})", config.max_connections);
    Ok(pool)
}
