use crate::models::DbService;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_service(
    pool: &Pool<Postgres>,
    name: &str,
    description: Option<&str>,
    duration_minutes: i32,
    price: &str,
) -> Result<DbService> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let service = sqlx::query_as::<_, DbService>(
        r#"
        INSERT INTO services (id, name, description, duration_minutes, price, is_active, created_at)
        VALUES ($1, $2, $3, $4, $5::NUMERIC, TRUE, $6)
        RETURNING id, name, description, duration_minutes, price::TEXT AS price, is_active, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(duration_minutes)
    .bind(price)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(service)
}

pub async fn list_active_services(pool: &Pool<Postgres>) -> Result<Vec<DbService>> {
    let services = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, name, description, duration_minutes, price::TEXT AS price, is_active, created_at
        FROM services
        WHERE is_active
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(services)
}

pub async fn get_active_service_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbService>> {
    let service = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, name, description, duration_minutes, price::TEXT AS price, is_active, created_at
        FROM services
        WHERE id = $1 AND is_active
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(service)
}
