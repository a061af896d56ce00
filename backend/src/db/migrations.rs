use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    let migrator = sqlx::migrate!("./migrations");
    migrator.run(pool).await?;

    let latest = migrator.iter().map(|m| m.version).max().unwrap_or(0);
    info!(
        "📦 Schema up to date: {} embedded migration(s), latest version {}",
        migrator.iter().count(),
        latest
    );

    Ok(())
}
