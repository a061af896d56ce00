use crate::models::{Building, NewRide, Ride, RideContext, RideStatus, RideWithOwner, User};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

const RIDE_COLUMNS: &str = r#"
    r.id AS ride_id, r.user_id, r.building_id, r.destination_lat, r.destination_lng,
    r.departure_time, r.gender_preference, r.max_detour_km, r.cost_per_person,
    r.total_seats, r.available_seats, r.status,
    r.created_at AS ride_created_at, r.updated_at AS ride_updated_at
"#;

const OWNER_COLUMNS: &str = r#"
    u.id AS owner_id, u.name AS owner_name, u.gender AS owner_gender,
    u.trust_score AS owner_trust_score, u.building_id AS owner_building_id,
    u.created_at AS owner_created_at, u.updated_at AS owner_updated_at
"#;

pub async fn create_ride(pool: &PgPool, new_ride: NewRide) -> Result<Ride> {
    let ride = sqlx::query_as::<_, Ride>(
        r#"
        INSERT INTO rides (
            id, user_id, building_id, destination_lat, destination_lng, departure_time,
            gender_preference, max_detour_km, cost_per_person, total_seats, available_seats
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id, user_id, building_id, destination_lat, destination_lng, departure_time,
                  gender_preference, max_detour_km, cost_per_person, total_seats,
                  available_seats, status, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new_ride.user_id)
    .bind(new_ride.building_id)
    .bind(new_ride.destination_lat)
    .bind(new_ride.destination_lng)
    .bind(new_ride.departure_time)
    .bind(new_ride.gender_preference)
    .bind(new_ride.max_detour_km)
    .bind(new_ride.cost_per_person)
    .bind(new_ride.total_seats)
    .bind(new_ride.available_seats)
    .fetch_one(pool)
    .await?;

    Ok(ride)
}

/// Load a ride together with its owning user and building.
pub async fn find_ride_context(pool: &PgPool, ride_id: Uuid) -> Result<Option<RideContext>> {
    let sql = format!(
        r#"
        SELECT {RIDE_COLUMNS}, {OWNER_COLUMNS},
               b.id AS b_id, b.name AS b_name, b.latitude AS b_latitude,
               b.longitude AS b_longitude, b.created_at AS b_created_at
        FROM rides r
        JOIN users u ON r.user_id = u.id
        JOIN buildings b ON r.building_id = b.id
        WHERE r.id = $1
        "#
    );

    let row = sqlx::query(&sql).bind(ride_id).fetch_optional(pool).await?;

    match row {
        Some(row) => Ok(Some(RideContext {
            ride: ride_from_row(&row)?,
            owner: owner_from_row(&row)?,
            building: building_from_row(&row)?,
        })),
        None => Ok(None),
    }
}

/// Active rides from the same building departing inside the window, excluding
/// the source ride and anything owned by the source user. Full rides are not
/// candidates.
pub async fn find_candidate_rides(
    pool: &PgPool,
    building_id: Uuid,
    exclude_ride_id: Uuid,
    exclude_user_id: Uuid,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<Vec<RideWithOwner>> {
    let sql = format!(
        r#"
        SELECT {RIDE_COLUMNS}, {OWNER_COLUMNS}
        FROM rides r
        JOIN users u ON r.user_id = u.id
        WHERE r.building_id = $1
          AND r.status = $2
          AND r.id != $3
          AND r.user_id != $4
          AND r.departure_time BETWEEN $5 AND $6
          AND r.available_seats > 0
        ORDER BY r.departure_time ASC
        "#
    );

    let rows = sqlx::query(&sql)
        .bind(building_id)
        .bind(RideStatus::Active)
        .bind(exclude_ride_id)
        .bind(exclude_user_id)
        .bind(window_start)
        .bind(window_end)
        .fetch_all(pool)
        .await?;

    let mut candidates = Vec::with_capacity(rows.len());
    for row in rows {
        candidates.push(RideWithOwner {
            ride: ride_from_row(&row)?,
            owner: owner_from_row(&row)?,
        });
    }

    Ok(candidates)
}

fn ride_from_row(row: &PgRow) -> Result<Ride, sqlx::Error> {
    Ok(Ride {
        id: row.try_get("ride_id")?,
        user_id: row.try_get("user_id")?,
        building_id: row.try_get("building_id")?,
        destination_lat: row.try_get("destination_lat")?,
        destination_lng: row.try_get("destination_lng")?,
        departure_time: row.try_get("departure_time")?,
        gender_preference: row.try_get("gender_preference")?,
        max_detour_km: row.try_get("max_detour_km")?,
        cost_per_person: row.try_get("cost_per_person")?,
        total_seats: row.try_get("total_seats")?,
        available_seats: row.try_get("available_seats")?,
        status: row.try_get("status")?,
        created_at: row.try_get("ride_created_at")?,
        updated_at: row.try_get("ride_updated_at")?,
    })
}

fn owner_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("owner_id")?,
        name: row.try_get("owner_name")?,
        gender: row.try_get("owner_gender")?,
        trust_score: row.try_get("owner_trust_score")?,
        building_id: row.try_get("owner_building_id")?,
        created_at: row.try_get("owner_created_at")?,
        updated_at: row.try_get("owner_updated_at")?,
    })
}

fn building_from_row(row: &PgRow) -> Result<Building, sqlx::Error> {
    Ok(Building {
        id: row.try_get("b_id")?,
        name: row.try_get("b_name")?,
        latitude: row.try_get("b_latitude")?,
        longitude: row.try_get("b_longitude")?,
        created_at: row.try_get("b_created_at")?,
    })
}
