use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_confidence", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchConfidence {
    High,
    Medium,
    Low,
}

/// A scored, time-limited pairing between a source ride and a compatible ride.
///
/// Lifecycle: PENDING until responded to (ACCEPTED/DECLINED, exactly once) or
/// past `expires_at`. Readers must filter `expires_at > now`; rows are never
/// deleted and `expires_at` is never extended.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RideMatch {
    pub id: Uuid,
    pub source_ride_id: Uuid,
    pub target_ride_id: Uuid,
    pub target_user_id: Uuid,
    pub score: f64,
    pub confidence: MatchConfidence,
    pub destination_proximity: f64,
    pub time_alignment: f64,
    pub trust_score: f64,
    pub previous_interactions: f64,
    pub destination_distance_m: f64,
    pub time_difference_min: f64,
    pub estimated_savings: f64,
    pub co2_reduction_kg: f64,
    pub reasons: Vec<String>,
    pub status: MatchStatus,
    pub expires_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to persist a freshly scored match.
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub source_ride_id: Uuid,
    pub target_ride_id: Uuid,
    pub target_user_id: Uuid,
    pub score: f64,
    pub confidence: MatchConfidence,
    pub destination_proximity: f64,
    pub time_alignment: f64,
    pub trust_score: f64,
    pub previous_interactions: f64,
    pub destination_distance_m: f64,
    pub time_difference_min: f64,
    pub estimated_savings: f64,
    pub co2_reduction_kg: f64,
    pub reasons: Vec<String>,
    pub expires_at: DateTime<Utc>,
}
