use crate::models::{Gender, User};
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create_user(
    pool: &PgPool,
    name: &str,
    gender: Gender,
    trust_score: f64,
    building_id: Uuid,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, gender, trust_score, building_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, gender, trust_score, building_id, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(gender)
    .bind(trust_score)
    .bind(building_id)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, gender, trust_score, building_id, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
