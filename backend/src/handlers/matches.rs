use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db,
    models::{MatchStatus, RideMatch},
    AppState,
};

use super::{error_body, ErrorResponse};

/// Pending, unexpired matches for a ride, best score first.
pub async fn get_ride_matches(
    State(state): State<AppState>,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<Vec<RideMatch>>, (StatusCode, Json<ErrorResponse>)> {
    let matches = db::matches::find_pending_matches(&state.pool, ride_id, Utc::now())
        .await
        .map_err(|e| {
            tracing::error!("Failed to list matches for ride {}: {}", ride_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Failed to list matches"),
            )
        })?;

    Ok(Json(matches))
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub accept: bool,
}

/// Accept or decline a pending match. The transition happens exactly once;
/// accepting is advisory and does not join the responder to the ride.
pub async fn respond_to_match(
    State(state): State<AppState>,
    Path(match_id): Path<Uuid>,
    Json(req): Json<RespondRequest>,
) -> Result<Json<RideMatch>, (StatusCode, Json<ErrorResponse>)> {
    let store_error = |e: anyhow::Error| {
        tracing::error!("Failed to respond to match {}: {}", match_id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body("Failed to respond to match"),
        )
    };

    let existing = db::matches::find_match_by_id(&state.pool, match_id)
        .await
        .map_err(store_error)?
        .ok_or((StatusCode::NOT_FOUND, error_body("Match not found")))?;

    let now = Utc::now();

    if existing.status != MatchStatus::Pending {
        return Err((
            StatusCode::CONFLICT,
            error_body("Match has already been responded to"),
        ));
    }

    if existing.expires_at <= now {
        return Err((StatusCode::GONE, error_body("Match has expired")));
    }

    let status = if req.accept {
        MatchStatus::Accepted
    } else {
        MatchStatus::Declined
    };

    let updated = db::matches::respond_to_match(&state.pool, match_id, status, now)
        .await
        .map_err(store_error)?
        // Lost a race against another response or the expiry boundary
        .ok_or((
            StatusCode::CONFLICT,
            error_body("Match has already been responded to"),
        ))?;

    Ok(Json(updated))
}
