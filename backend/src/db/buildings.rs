use crate::models::Building;
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create_building(
    pool: &PgPool,
    name: &str,
    latitude: f64,
    longitude: f64,
) -> Result<Building> {
    let building = sqlx::query_as::<_, Building>(
        r#"
        INSERT INTO buildings (id, name, latitude, longitude)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, latitude, longitude, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(latitude)
    .bind(longitude)
    .fetch_one(pool)
    .await?;

    Ok(building)
}

pub async fn get_building_by_id(pool: &PgPool, building_id: Uuid) -> Result<Option<Building>> {
    let building = sqlx::query_as::<_, Building>(
        r#"
        SELECT id, name, latitude, longitude, created_at
        FROM buildings
        WHERE id = $1
        "#,
    )
    .bind(building_id)
    .fetch_optional(pool)
    .await?;

    Ok(building)
}
