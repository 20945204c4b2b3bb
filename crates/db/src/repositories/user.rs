use crate::models::DbUser;
use chrono::{NaiveDate, Utc};
use eyre::{eyre, Result};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, role, phone, address, date_of_birth, created_at";

/// Fields for a new account row.
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: &'a str,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
}

pub async fn create_user(pool: &Pool<Postgres>, user: NewUser<'_>) -> Result<DbUser> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating user: id={}, email={}, role={}", id, user.email, user.role);

    let created = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        INSERT INTO users (id, email, password_hash, first_name, last_name, role, phone, address, date_of_birth, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.role)
    .bind(user.phone)
    .bind(user.address)
    .bind(user.date_of_birth)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(pool: &Pool<Postgres>, email: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Fields a user may change on their own profile. `None` keeps the stored value.
#[derive(Default)]
pub struct ProfileChanges<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
}

pub async fn update_user_profile(
    pool: &Pool<Postgres>,
    id: Uuid,
    changes: ProfileChanges<'_>,
) -> Result<DbUser> {
    let user = get_user_by_id(pool, id)
        .await?
        .ok_or_else(|| eyre!("User not found"))?;

    let first_name = changes.first_name.unwrap_or(&user.first_name);
    let last_name = changes.last_name.unwrap_or(&user.last_name);
    let phone = changes.phone.or(user.phone.as_deref());
    let address = changes.address.or(user.address.as_deref());
    let date_of_birth = changes.date_of_birth.or(user.date_of_birth);

    let updated = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        UPDATE users
        SET first_name = $2, last_name = $3, phone = $4, address = $5, date_of_birth = $6
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(first_name)
    .bind(last_name)
    .bind(phone)
    .bind(address)
    .bind(date_of_birth)
    .fetch_one(pool)
    .await?;

    Ok(updated)
}
