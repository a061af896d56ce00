use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    constants::DEFAULT_TRUST_SCORE,
    db,
    matching::geo::is_valid_coordinates,
    models::{Building, Gender, User},
    AppState,
};

use super::{error_body, ErrorResponse};

#[derive(Debug, Deserialize)]
pub struct CreateBuildingRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

pub async fn create_building(
    State(state): State<AppState>,
    Json(req): Json<CreateBuildingRequest>,
) -> Result<(StatusCode, Json<Building>), (StatusCode, Json<ErrorResponse>)> {
    if req.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, error_body("Building name is required")));
    }

    if !is_valid_coordinates(req.latitude, req.longitude) {
        return Err((StatusCode::BAD_REQUEST, error_body("Invalid building coordinates")));
    }

    let building =
        db::buildings::create_building(&state.pool, req.name.trim(), req.latitude, req.longitude)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create building: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("Failed to create building"),
                )
            })?;

    Ok((StatusCode::CREATED, Json(building)))
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub gender: Gender,
    pub building_id: Uuid,
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>), (StatusCode, Json<ErrorResponse>)> {
    if req.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, error_body("Name is required")));
    }

    let building = db::buildings::get_building_by_id(&state.pool, req.building_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up building {}: {}", req.building_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Failed to register user"),
            )
        })?;

    if building.is_none() {
        return Err((StatusCode::BAD_REQUEST, error_body("Building not found")));
    }

    let user = db::users::create_user(
        &state.pool,
        req.name.trim(),
        req.gender,
        DEFAULT_TRUST_SCORE,
        req.building_id,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to create user: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body("Failed to register user"),
        )
    })?;

    Ok((StatusCode::CREATED, Json(user)))
}
