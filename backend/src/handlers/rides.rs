use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    constants::{DEFAULT_MAX_DETOUR_KM, DEFAULT_TOTAL_SEATS},
    db,
    matching::engine::{run_matching, MatchingParams},
    matching::geo::is_valid_coordinates,
    models::{GenderPreference, NewRide, Ride, RideContext},
    AppState,
};

use super::{error_body, ErrorResponse};

#[derive(Debug, Deserialize)]
pub struct CreateRideRequest {
    pub user_id: Uuid,
    /// Defaults to the owner's building
    pub building_id: Option<Uuid>,
    pub destination_lat: f64,
    pub destination_lng: f64,
    pub departure_time: DateTime<Utc>,
    pub gender_preference: Option<GenderPreference>,
    pub max_detour_km: Option<f64>,
    pub cost_per_person: Option<f64>,
    pub total_seats: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CreateRideResponse {
    pub ride: Ride,
    pub matches_found: usize,
}

/// Create a ride offer and run matching inline. Matching is best-effort:
/// a failure is logged and the ride is still created.
pub async fn create_ride(
    State(state): State<AppState>,
    Json(req): Json<CreateRideRequest>,
) -> Result<(StatusCode, Json<CreateRideResponse>), (StatusCode, Json<ErrorResponse>)> {
    if !is_valid_coordinates(req.destination_lat, req.destination_lng) {
        return Err((
            StatusCode::BAD_REQUEST,
            error_body("Invalid destination coordinates"),
        ));
    }

    if req.departure_time <= Utc::now() {
        return Err((
            StatusCode::BAD_REQUEST,
            error_body("Departure time must be in the future"),
        ));
    }

    let max_detour_km = req.max_detour_km.unwrap_or(DEFAULT_MAX_DETOUR_KM);
    if max_detour_km <= 0.0 || !max_detour_km.is_finite() {
        return Err((
            StatusCode::BAD_REQUEST,
            error_body("Maximum detour must be positive"),
        ));
    }

    if matches!(req.cost_per_person, Some(cost) if cost < 0.0 || !cost.is_finite()) {
        return Err((
            StatusCode::BAD_REQUEST,
            error_body("Cost per person cannot be negative"),
        ));
    }

    let total_seats = req.total_seats.unwrap_or(DEFAULT_TOTAL_SEATS);
    if total_seats < 2 {
        return Err((
            StatusCode::BAD_REQUEST,
            error_body("A shared ride needs at least 2 seats"),
        ));
    }

    let owner = db::users::get_user_by_id(&state.pool, req.user_id)
        .await
        .map_err(internal("Failed to create ride"))?
        .ok_or((StatusCode::BAD_REQUEST, error_body("User not found")))?;

    let building_id = req.building_id.unwrap_or(owner.building_id);
    db::buildings::get_building_by_id(&state.pool, building_id)
        .await
        .map_err(internal("Failed to create ride"))?
        .ok_or((StatusCode::BAD_REQUEST, error_body("Building not found")))?;

    let ride = db::rides::create_ride(
        &state.pool,
        NewRide {
            user_id: owner.id,
            building_id,
            destination_lat: req.destination_lat,
            destination_lng: req.destination_lng,
            departure_time: req.departure_time,
            gender_preference: req.gender_preference.unwrap_or(GenderPreference::Any),
            max_detour_km,
            cost_per_person: req.cost_per_person,
            total_seats,
            // The driver occupies one seat from the start
            available_seats: total_seats - 1,
        },
    )
    .await
    .map_err(internal("Failed to create ride"))?;

    let matches_found = match run_matching(
        &state.pool,
        &state.push,
        ride.id,
        &MatchingParams::default(),
    )
    .await
    {
        Ok(outcome) => {
            tracing::info!(
                "Ride {} created, {} match(es) from {} candidate(s)",
                ride.id,
                outcome.matches_found,
                outcome.candidates_considered
            );
            outcome.matches_found
        }
        Err(e) => {
            tracing::warn!("Matching for ride {} failed (ride kept): {}", ride.id, e);
            0
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateRideResponse {
            ride,
            matches_found,
        }),
    ))
}

pub async fn get_ride(
    State(state): State<AppState>,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<RideContext>, (StatusCode, Json<ErrorResponse>)> {
    let context = db::rides::find_ride_context(&state.pool, ride_id)
        .await
        .map_err(internal("Failed to load ride"))?
        .ok_or((StatusCode::NOT_FOUND, error_body("Ride not found")))?;

    Ok(Json(context))
}

fn internal(
    message: &'static str,
) -> impl FnOnce(anyhow::Error) -> (StatusCode, Json<ErrorResponse>) {
    move |e| {
        tracing::error!("{}: {}", message, e);
        (StatusCode::INTERNAL_SERVER_ERROR, error_body(message))
    }
}
