use anyhow::Result;
use chrono::Utc;
use clap::{Arg, Command};
use sharetaxi::db::{self, get_db_pool, DatabaseConfig};
use sharetaxi::utils::init_logging;
use tracing::info;

/// One-shot sweep that marks overdue PENDING matches as EXPIRED.
///
/// Listing queries already filter on `expires_at`, so this sweep only
/// reconciles stored status for reporting; skipping it loses nothing.
#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let matches = Command::new("expire-matches")
        .about("Mark overdue pending matches as EXPIRED")
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Count overdue matches without updating them")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let dry_run = matches.get_flag("dry-run");

    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    let now = Utc::now();
    let overdue = db::matches::count_overdue_pending(&pool, now).await?;
    info!("🧮 {} overdue pending match(es)", overdue);

    if dry_run {
        info!("Dry run, nothing updated");
        return Ok(());
    }

    let updated = db::matches::expire_overdue_matches(&pool, now).await?;
    info!("🧹 Marked {} match(es) as EXPIRED", updated);

    Ok(())
}
