use anyhow::Result;
use dotenvy::dotenv;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DB_ACQUIRE_TIMEOUT_SECONDS, DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_DB_MIN_CONNECTIONS,
};

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Connections kept warm; ride creation runs matching inline and would
    /// otherwise pay connection setup on the request path
    pub min_connections: u32,
    /// Matching has no deadline of its own, so pool acquisition needs one
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            max_connections: env_u32("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            min_connections: env_u32("DB_MIN_CONNECTIONS", DEFAULT_DB_MIN_CONNECTIONS),
            acquire_timeout: Duration::from_secs(u64::from(env_u32(
                "DB_ACQUIRE_TIMEOUT_SECONDS",
                DEFAULT_DB_ACQUIRE_TIMEOUT_SECONDS,
            ))),
        })
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

pub async fn get_db_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.database_url)
        .await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_u32_falls_back_on_garbage() {
        assert_eq!(env_u32("SHARETAXI_TEST_UNSET_VAR", 7), 7);
    }
}
