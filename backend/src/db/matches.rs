use crate::models::{MatchStatus, NewMatch, RideMatch};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const MATCH_COLUMNS: &str = r#"
    id, source_ride_id, target_ride_id, target_user_id, score, confidence,
    destination_proximity, time_alignment, trust_score, previous_interactions,
    destination_distance_m, time_difference_min, estimated_savings, co2_reduction_kg,
    reasons, status, expires_at, responded_at, created_at
"#;

/// Insert a freshly scored match. Returns `None` when the ride pair already
/// has a match (unique pairing index), making re-runs idempotent.
pub async fn create_match(pool: &PgPool, new_match: NewMatch) -> Result<Option<RideMatch>> {
    let sql = format!(
        r#"
        INSERT INTO matches (
            id, source_ride_id, target_ride_id, target_user_id, score, confidence,
            destination_proximity, time_alignment, trust_score, previous_interactions,
            destination_distance_m, time_difference_min, estimated_savings,
            co2_reduction_kg, reasons, expires_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        ON CONFLICT (source_ride_id, target_ride_id) DO NOTHING
        RETURNING {MATCH_COLUMNS}
        "#
    );

    let created = sqlx::query_as::<_, RideMatch>(&sql)
        .bind(Uuid::new_v4())
        .bind(new_match.source_ride_id)
        .bind(new_match.target_ride_id)
        .bind(new_match.target_user_id)
        .bind(new_match.score)
        .bind(new_match.confidence)
        .bind(new_match.destination_proximity)
        .bind(new_match.time_alignment)
        .bind(new_match.trust_score)
        .bind(new_match.previous_interactions)
        .bind(new_match.destination_distance_m)
        .bind(new_match.time_difference_min)
        .bind(new_match.estimated_savings)
        .bind(new_match.co2_reduction_kg)
        .bind(new_match.reasons)
        .bind(new_match.expires_at)
        .fetch_optional(pool)
        .await?;

    Ok(created)
}

/// Pending, unexpired matches for a source ride, best score first. Expiry is
/// enforced here by the `expires_at` filter; no sweeper is required.
pub async fn find_pending_matches(
    pool: &PgPool,
    source_ride_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<RideMatch>> {
    let sql = format!(
        r#"
        SELECT {MATCH_COLUMNS}
        FROM matches
        WHERE source_ride_id = $1
          AND status = $2
          AND expires_at > $3
        ORDER BY score DESC, created_at ASC
        "#
    );

    let matches = sqlx::query_as::<_, RideMatch>(&sql)
        .bind(source_ride_id)
        .bind(MatchStatus::Pending)
        .bind(now)
        .fetch_all(pool)
        .await?;

    Ok(matches)
}

pub async fn find_match_by_id(pool: &PgPool, match_id: Uuid) -> Result<Option<RideMatch>> {
    let sql = format!(
        r#"
        SELECT {MATCH_COLUMNS}
        FROM matches
        WHERE id = $1
        "#
    );

    let ride_match = sqlx::query_as::<_, RideMatch>(&sql)
        .bind(match_id)
        .fetch_optional(pool)
        .await?;

    Ok(ride_match)
}

/// Transition a pending, unexpired match to ACCEPTED or DECLINED, stamping
/// `responded_at`. The status guard makes the transition happen exactly once;
/// returns `None` when the match was already responded to or has expired.
pub async fn respond_to_match(
    pool: &PgPool,
    match_id: Uuid,
    status: MatchStatus,
    now: DateTime<Utc>,
) -> Result<Option<RideMatch>> {
    let sql = format!(
        r#"
        UPDATE matches
        SET status = $2, responded_at = $3
        WHERE id = $1
          AND status = $4
          AND expires_at > $3
        RETURNING {MATCH_COLUMNS}
        "#
    );

    let updated = sqlx::query_as::<_, RideMatch>(&sql)
        .bind(match_id)
        .bind(status)
        .bind(now)
        .bind(MatchStatus::Pending)
        .fetch_optional(pool)
        .await?;

    Ok(updated)
}

pub async fn count_overdue_pending(pool: &PgPool, now: DateTime<Utc>) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM matches WHERE status = $1 AND expires_at <= $2",
    )
    .bind(MatchStatus::Pending)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Reconcile stored status for matches that outlived their expiry window.
/// Reads already exclude them; this exists for reporting only.
pub async fn expire_overdue_matches(pool: &PgPool, now: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE matches SET status = $1 WHERE status = $2 AND expires_at <= $3",
    )
    .bind(MatchStatus::Expired)
    .bind(MatchStatus::Pending)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
