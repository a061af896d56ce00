use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::users::{Building, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ride_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Active,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender_preference", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenderPreference {
    Any,
    SameGender,
    Male,
    Female,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ride {
    pub id: Uuid,
    pub user_id: Uuid,
    pub building_id: Uuid,
    pub destination_lat: f64,
    pub destination_lng: f64,
    pub departure_time: DateTime<Utc>,
    pub gender_preference: GenderPreference,
    pub max_detour_km: f64,
    pub cost_per_person: Option<f64>,
    pub total_seats: i32,
    pub available_seats: i32,
    pub status: RideStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ride joined with its owning user, as the matcher consumes candidates.
#[derive(Debug, Clone, Serialize)]
pub struct RideWithOwner {
    pub ride: Ride,
    pub owner: User,
}

/// Source ride with its full context (owner and building).
#[derive(Debug, Clone, Serialize)]
pub struct RideContext {
    pub ride: Ride,
    pub owner: User,
    pub building: Building,
}

/// Fields required to persist a new ride offer.
#[derive(Debug, Clone)]
pub struct NewRide {
    pub user_id: Uuid,
    pub building_id: Uuid,
    pub destination_lat: f64,
    pub destination_lng: f64,
    pub departure_time: DateTime<Utc>,
    pub gender_preference: GenderPreference,
    pub max_detour_km: f64,
    pub cost_per_person: Option<f64>,
    pub total_seats: i32,
    pub available_seats: i32,
}
