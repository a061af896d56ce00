pub mod constants;
pub mod db;
pub mod handlers;
pub mod matching;
pub mod models;
pub mod services;
pub mod utils;

pub use db::connection::get_db_pool;
pub use utils::config::Config;

// Re-export common types
pub use anyhow::Result;
pub use chrono::{DateTime, Utc};
pub use sqlx::{PgPool, Row};
pub use uuid::Uuid;

use services::PushService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub push: PushService,
}
