use crate::models::DbDoctor;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const DOCTOR_COLUMNS: &str = "id, profile_id, specialty, license_number, years_experience, \
    consultation_fee::TEXT AS consultation_fee, education, bio, avatar_url, is_available, created_at";

/// Fields for a new doctor row.
pub struct NewDoctor<'a> {
    pub profile_id: Uuid,
    pub specialty: &'a str,
    pub license_number: &'a str,
    pub years_experience: i32,
    pub consultation_fee: &'a str,
    pub education: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
}

pub async fn create_doctor(pool: &Pool<Postgres>, doctor: NewDoctor<'_>) -> Result<DbDoctor> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating doctor: id={}, profile_id={}", id, doctor.profile_id);

    let created = sqlx::query_as::<_, DbDoctor>(&format!(
        r#"
        INSERT INTO doctors (id, profile_id, specialty, license_number, years_experience,
                             consultation_fee, education, bio, avatar_url, is_available, created_at)
        VALUES ($1, $2, $3, $4, $5, $6::NUMERIC, $7, $8, $9, TRUE, $10)
        RETURNING {DOCTOR_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(doctor.profile_id)
    .bind(doctor.specialty)
    .bind(doctor.license_number)
    .bind(doctor.years_experience)
    .bind(doctor.consultation_fee)
    .bind(doctor.education)
    .bind(doctor.bio)
    .bind(doctor.avatar_url)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

pub async fn get_doctor_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbDoctor>> {
    let doctor = sqlx::query_as::<_, DbDoctor>(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(doctor)
}

pub async fn get_doctor_by_profile_id(
    pool: &Pool<Postgres>,
    profile_id: Uuid,
) -> Result<Option<DbDoctor>> {
    let doctor = sqlx::query_as::<_, DbDoctor>(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE profile_id = $1"
    ))
    .bind(profile_id)
    .fetch_optional(pool)
    .await?;

    Ok(doctor)
}

pub async fn list_available_doctors(pool: &Pool<Postgres>) -> Result<Vec<DbDoctor>> {
    let doctors = sqlx::query_as::<_, DbDoctor>(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE is_available ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(doctors)
}
