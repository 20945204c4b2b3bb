use std::collections::HashSet;

use crate::{models::DbAppointment, DbPool};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use clinicbook_core::{
    models::appointment::AppointmentStatus,
    repositories::AppointmentRepository,
};
use eyre::{eyre, Result};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str = "id, patient_id, doctor_id, service_id, appointment_date, \
    appointment_time, status, symptoms, notes, created_at, updated_at";

/// Fields for a new booking. Status always starts as pending.
pub struct NewAppointment<'a> {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub service_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub symptoms: Option<&'a str>,
    pub notes: Option<&'a str>,
}

pub async fn create_appointment(
    pool: &Pool<Postgres>,
    appointment: NewAppointment<'_>,
) -> Result<DbAppointment> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating appointment: id={}, doctor={}, date={}, time={}",
        id, appointment.doctor_id, appointment.appointment_date, appointment.appointment_time
    );

    let created = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments (id, patient_id, doctor_id, service_id, appointment_date,
                                  appointment_time, status, symptoms, notes, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(appointment.patient_id)
    .bind(appointment.doctor_id)
    .bind(appointment.service_id)
    .bind(appointment.appointment_date)
    .bind(appointment.appointment_time)
    .bind(AppointmentStatus::Pending.as_str())
    .bind(appointment.symptoms)
    .bind(appointment.notes)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

pub async fn get_appointment_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn list_appointments_for_patient(
    pool: &Pool<Postgres>,
    patient_id: Uuid,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE patient_id = $1
        ORDER BY appointment_date DESC, appointment_time DESC
        "#
    ))
    .bind(patient_id)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn list_appointments_for_doctor(
    pool: &Pool<Postgres>,
    doctor_id: Uuid,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE doctor_id = $1
        ORDER BY appointment_date DESC, appointment_time DESC
        "#
    ))
    .bind(doctor_id)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Fields that may change on an existing booking. `None` keeps the stored value.
#[derive(Default)]
pub struct AppointmentChanges<'a> {
    pub status: Option<AppointmentStatus>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    pub symptoms: Option<&'a str>,
    pub notes: Option<&'a str>,
}

pub async fn update_appointment(
    pool: &Pool<Postgres>,
    id: Uuid,
    changes: AppointmentChanges<'_>,
) -> Result<DbAppointment> {
    let appointment = get_appointment_by_id(pool, id)
        .await?
        .ok_or_else(|| eyre!("Appointment not found"))?;

    let status = changes
        .status
        .map(|s| s.as_str().to_string())
        .unwrap_or(appointment.status);
    let appointment_date = changes.appointment_date.unwrap_or(appointment.appointment_date);
    let appointment_time = changes.appointment_time.unwrap_or(appointment.appointment_time);
    let symptoms = changes.symptoms.or(appointment.symptoms.as_deref());
    let notes = changes.notes.or(appointment.notes.as_deref());

    let updated = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET status = $2, appointment_date = $3, appointment_time = $4,
            symptoms = $5, notes = $6, updated_at = $7
        WHERE id = $1
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status)
    .bind(appointment_date)
    .bind(appointment_time)
    .bind(symptoms)
    .bind(notes)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(updated)
}

pub async fn delete_appointment(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_occupied_times(
    pool: &Pool<Postgres>,
    doctor_id: Uuid,
    date: NaiveDate,
    statuses: &[AppointmentStatus],
) -> Result<Vec<NaiveTime>> {
    let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();

    let times = sqlx::query_scalar::<_, NaiveTime>(
        r#"
        SELECT appointment_time
        FROM appointments
        WHERE doctor_id = $1 AND appointment_date = $2 AND status = ANY($3)
        "#,
    )
    .bind(doctor_id)
    .bind(date)
    .bind(statuses)
    .fetch_all(pool)
    .await?;

    Ok(times)
}

/// PostgreSQL-backed occupancy lookups for the slot calculator.
#[derive(Clone)]
pub struct PgAppointmentRepository {
    pool: DbPool,
}

impl PgAppointmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for PgAppointmentRepository {
    async fn list_occupied_times(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        statuses: Vec<AppointmentStatus>,
    ) -> Result<HashSet<NaiveTime>> {
        let times = list_occupied_times(&self.pool, doctor_id, date, &statuses).await?;
        Ok(times.into_iter().collect())
    }
}
