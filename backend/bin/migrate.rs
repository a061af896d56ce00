use sharetaxi::db::DatabaseConfig;
use sharetaxi::{get_db_pool, utils};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    info!("🚕 Preparing the ShareTaxi schema...");
    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    sharetaxi::db::migrations::run_migrations(&pool).await?;

    // Read back what the database actually applied
    let applied = sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(version) FROM _sqlx_migrations")
        .fetch_one(&pool)
        .await?;
    match applied {
        Some(version) => info!("✅ Database schema at version {}", version),
        None => info!("✅ Database schema is empty (no migrations recorded)"),
    }

    Ok(())
}
