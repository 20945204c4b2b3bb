use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use clinicbook_core::{
    errors::ClinicError,
    models::{
        account::{User, UserRole},
        doctor::{CreateDoctorRequest, Doctor, DoctorResponse},
        schedule::{DayOfWeek, ScheduleResponse, UpsertScheduleRequest, WeeklySchedule},
    },
};
use clinicbook_db::{
    models::{DbDoctor, DbWeeklySchedule},
    repositories::{
        doctor::{self, NewDoctor},
        schedule, user,
    },
};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::{
    middleware::{auth::AuthUser, error_handling::AppError},
    ApiState,
};

fn into_schedule_responses(rows: Vec<DbWeeklySchedule>) -> Result<Vec<ScheduleResponse>, AppError> {
    rows.into_iter()
        .map(|row| Ok(WeeklySchedule::try_from(row)?.into()))
        .collect()
}

async fn build_doctor_response(
    state: &ApiState,
    row: DbDoctor,
    schedules: Vec<ScheduleResponse>,
) -> Result<DoctorResponse, AppError> {
    let profile = user::get_user_by_id(&state.db_pool, row.profile_id)
        .await?
        .ok_or_else(|| {
            ClinicError::NotFound(format!("Profile for doctor {} not found", row.id))
        })?;
    let profile = User::try_from(profile)?;

    Ok(DoctorResponse::new(Doctor::from(row), profile.into(), schedules))
}

async fn load_available_doctor(state: &ApiState, id: Uuid) -> Result<DbDoctor, AppError> {
    doctor::get_doctor_by_id(&state.db_pool, id)
        .await?
        .filter(|row| row.is_available)
        .ok_or_else(|| AppError(ClinicError::NotFound(format!("Doctor with ID {} not found", id))))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<DoctorResponse>>, AppError> {
    let doctors = doctor::list_available_doctors(&state.db_pool).await?;

    // Fetch every doctor's schedule in one query, then group by doctor
    let ids: Vec<Uuid> = doctors.iter().map(|d| d.id).collect();
    let mut schedules_by_doctor: HashMap<Uuid, Vec<DbWeeklySchedule>> = HashMap::new();
    for row in schedule::list_available_schedules(&state.db_pool, &ids).await? {
        schedules_by_doctor.entry(row.doctor_id).or_default().push(row);
    }

    let mut response = Vec::with_capacity(doctors.len());
    for row in doctors {
        let schedules = into_schedule_responses(
            schedules_by_doctor.remove(&row.id).unwrap_or_default(),
        )?;
        response.push(build_doctor_response(&state, row, schedules).await?);
    }

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DoctorResponse>, AppError> {
    let row = load_available_doctor(&state, id).await?;
    let schedules =
        into_schedule_responses(schedule::list_available_schedules(&state.db_pool, &[id]).await?)?;

    Ok(Json(build_doctor_response(&state, row, schedules).await?))
}

#[axum::debug_handler]
pub async fn list_doctor_schedules(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let rows = schedule::list_available_schedules(&state.db_pool, &[id]).await?;
    Ok(Json(into_schedule_responses(rows)?))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
    Json(payload): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<DoctorResponse>), AppError> {
    caller.require_admin()?;
    payload.validate().map_err(ClinicError::Validation)?;

    let profile = user::get_user_by_id(&state.db_pool, payload.profile_id)
        .await?
        .ok_or_else(|| {
            ClinicError::NotFound(format!("User with ID {} not found", payload.profile_id))
        })?;
    if User::try_from(profile)?.role != UserRole::Doctor {
        return Err(AppError(ClinicError::Validation(
            "Profile must belong to a user with the doctor role".to_string(),
        )));
    }
    if doctor::get_doctor_by_profile_id(&state.db_pool, payload.profile_id)
        .await?
        .is_some()
    {
        return Err(AppError(ClinicError::Conflict(
            "A doctor already exists for this profile".to_string(),
        )));
    }

    let row = doctor::create_doctor(
        &state.db_pool,
        NewDoctor {
            profile_id: payload.profile_id,
            specialty: &payload.specialty,
            license_number: &payload.license_number,
            years_experience: payload.years_experience,
            consultation_fee: &payload.consultation_fee,
            education: payload.education.as_deref(),
            bio: payload.bio.as_deref(),
            avatar_url: payload.avatar_url.as_deref(),
        },
    )
    .await?;

    let response = build_doctor_response(&state, row, Vec::new()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Sets the doctor's window for one weekday. Only the doctor or an admin may do this.
#[axum::debug_handler]
pub async fn upsert_schedule(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
    Path((id, day)): Path<(Uuid, String)>,
    Json(payload): Json<UpsertScheduleRequest>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let day_of_week: DayOfWeek = day.parse().map_err(ClinicError::Validation)?;
    payload.validate().map_err(ClinicError::Validation)?;

    let row = doctor::get_doctor_by_id(&state.db_pool, id)
        .await?
        .ok_or_else(|| ClinicError::NotFound(format!("Doctor with ID {} not found", id)))?;

    if !caller.is_admin() && row.profile_id != caller.id {
        return Err(AppError(ClinicError::Authorization(
            "Only the doctor or an admin can change this schedule".to_string(),
        )));
    }

    let updated = schedule::upsert_weekly_schedule(
        &state.db_pool,
        id,
        day_of_week,
        payload.start_time,
        payload.end_time,
        payload.is_available,
    )
    .await?;

    Ok(Json(WeeklySchedule::try_from(updated)?.into()))
}
