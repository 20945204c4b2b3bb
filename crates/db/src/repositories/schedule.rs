use crate::{models::DbWeeklySchedule, DbPool};
use async_trait::async_trait;
use chrono::{NaiveTime, Utc};
use clinicbook_core::{
    models::schedule::{DayOfWeek, WeeklySchedule},
    repositories::WeeklyScheduleRepository,
};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const WEEKDAY_ORDER: &str = "array_position(ARRAY['monday','tuesday','wednesday','thursday','friday','saturday','sunday'], day_of_week::TEXT)";

pub async fn get_weekly_schedule(
    pool: &Pool<Postgres>,
    doctor_id: Uuid,
    day_of_week: DayOfWeek,
) -> Result<Option<DbWeeklySchedule>> {
    tracing::debug!("Getting {} schedule for doctor {}", day_of_week, doctor_id);

    let schedule = sqlx::query_as::<_, DbWeeklySchedule>(
        r#"
        SELECT id, doctor_id, day_of_week, start_time, end_time, is_available, created_at
        FROM weekly_schedules
        WHERE doctor_id = $1 AND day_of_week = $2
        "#,
    )
    .bind(doctor_id)
    .bind(day_of_week.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(schedule)
}

/// Available rows for the given doctors, Monday first.
pub async fn list_available_schedules(
    pool: &Pool<Postgres>,
    doctor_ids: &[Uuid],
) -> Result<Vec<DbWeeklySchedule>> {
    let schedules = sqlx::query_as::<_, DbWeeklySchedule>(&format!(
        r#"
        SELECT id, doctor_id, day_of_week, start_time, end_time, is_available, created_at
        FROM weekly_schedules
        WHERE doctor_id = ANY($1) AND is_available
        ORDER BY doctor_id, {WEEKDAY_ORDER}
        "#
    ))
    .bind(doctor_ids)
    .fetch_all(pool)
    .await?;

    Ok(schedules)
}

pub async fn upsert_weekly_schedule(
    pool: &Pool<Postgres>,
    doctor_id: Uuid,
    day_of_week: DayOfWeek,
    start_time: NaiveTime,
    end_time: NaiveTime,
    is_available: bool,
) -> Result<DbWeeklySchedule> {
    tracing::debug!(
        "Upserting {} schedule for doctor {}: {}-{}, available={}",
        day_of_week, doctor_id, start_time, end_time, is_available
    );

    let schedule = sqlx::query_as::<_, DbWeeklySchedule>(
        r#"
        INSERT INTO weekly_schedules (id, doctor_id, day_of_week, start_time, end_time, is_available, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (doctor_id, day_of_week)
        DO UPDATE SET start_time = $4, end_time = $5, is_available = $6
        RETURNING id, doctor_id, day_of_week, start_time, end_time, is_available, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(doctor_id)
    .bind(day_of_week.as_str())
    .bind(start_time)
    .bind(end_time)
    .bind(is_available)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(schedule)
}

/// PostgreSQL-backed schedule lookups for the slot calculator.
#[derive(Clone)]
pub struct PgWeeklyScheduleRepository {
    pool: DbPool,
}

impl PgWeeklyScheduleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WeeklyScheduleRepository for PgWeeklyScheduleRepository {
    async fn get_weekly_schedule(
        &self,
        doctor_id: Uuid,
        day_of_week: DayOfWeek,
    ) -> Result<Option<WeeklySchedule>> {
        get_weekly_schedule(&self.pool, doctor_id, day_of_week)
            .await?
            .map(WeeklySchedule::try_from)
            .transpose()
    }
}
