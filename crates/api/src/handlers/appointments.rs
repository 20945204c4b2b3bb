use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use clinicbook_core::{
    errors::ClinicError,
    models::{
        account::UserRole,
        appointment::{
            Appointment, AvailableSlotsResponse, CreateAppointmentRequest,
            UpdateAppointmentRequest,
        },
    },
};
use clinicbook_db::{
    models::DbAppointment,
    repositories::{
        appointment::{self, AppointmentChanges, NewAppointment},
        doctor, service,
    },
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    middleware::{auth::AuthUser, error_handling::AppError},
    ApiState,
};

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub granularity: Option<u32>,
}

fn into_appointments(rows: Vec<DbAppointment>) -> Result<Vec<Appointment>, AppError> {
    rows.into_iter()
        .map(|row| Ok(Appointment::try_from(row)?))
        .collect()
}

/// An appointment together with the caller's relation to it.
struct VisibleAppointment {
    row: DbAppointment,
    /// The booked doctor or an admin, as opposed to the patient.
    by_staff: bool,
}

/// Loads an appointment the caller is allowed to see.
///
/// Patients see their own bookings and doctors see bookings made with them.
/// Anything else is reported as missing rather than forbidden.
async fn load_visible_appointment(
    state: &ApiState,
    caller: &AuthUser,
    id: Uuid,
) -> Result<VisibleAppointment, AppError> {
    let not_found = || AppError(ClinicError::NotFound(format!("Appointment with ID {} not found", id)));

    let row = appointment::get_appointment_by_id(&state.db_pool, id)
        .await?
        .ok_or_else(not_found)?;

    if caller.is_admin() {
        return Ok(VisibleAppointment { row, by_staff: true });
    }

    if caller.role == UserRole::Doctor {
        let own_doctor = doctor::get_doctor_by_profile_id(&state.db_pool, caller.id).await?;
        if own_doctor.is_some_and(|d| d.id == row.doctor_id) {
            return Ok(VisibleAppointment { row, by_staff: true });
        }
    }

    if row.patient_id == caller.id {
        return Ok(VisibleAppointment { row, by_staff: false });
    }

    Err(not_found())
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let rows = if caller.role == UserRole::Doctor {
        match doctor::get_doctor_by_profile_id(&state.db_pool, caller.id).await? {
            Some(own) => appointment::list_appointments_for_doctor(&state.db_pool, own.id).await?,
            None => Vec::new(),
        }
    } else {
        appointment::list_appointments_for_patient(&state.db_pool, caller.id).await?
    };

    Ok(Json(into_appointments(rows)?))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment_time = payload.validate(state.clock.today())?;

    doctor::get_doctor_by_id(&state.db_pool, payload.doctor_id)
        .await?
        .ok_or_else(|| {
            ClinicError::NotFound(format!("Doctor with ID {} not found", payload.doctor_id))
        })?;
    service::get_active_service_by_id(&state.db_pool, payload.service_id)
        .await?
        .ok_or_else(|| {
            ClinicError::NotFound(format!("Service with ID {} not found", payload.service_id))
        })?;

    let row = appointment::create_appointment(
        &state.db_pool,
        NewAppointment {
            patient_id: caller.id,
            doctor_id: payload.doctor_id,
            service_id: payload.service_id,
            appointment_date: payload.appointment_date,
            appointment_time,
            symptoms: payload.symptoms.as_deref(),
            notes: payload.notes.as_deref(),
        },
    )
    .await?;

    info!(
        "Booked appointment {} with doctor {} on {} at {}",
        row.id, row.doctor_id, row.appointment_date, row.appointment_time
    );
    Ok((StatusCode::CREATED, Json(Appointment::try_from(row)?)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let visible = load_visible_appointment(&state, &caller, id).await?;
    Ok(Json(Appointment::try_from(visible.row)?))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let visible = load_visible_appointment(&state, &caller, id).await?;
    let appointment_time = payload.validate(state.clock.today(), visible.by_staff)?;

    let row = appointment::update_appointment(
        &state.db_pool,
        id,
        AppointmentChanges {
            status: payload.status,
            appointment_date: payload.appointment_date,
            appointment_time,
            symptoms: payload.symptoms.as_deref(),
            notes: payload.notes.as_deref(),
        },
    )
    .await?;

    Ok(Json(Appointment::try_from(row)?))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    load_visible_appointment(&state, &caller, id).await?;
    appointment::delete_appointment(&state.db_pool, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lists the free start times for a doctor on a date.
#[axum::debug_handler]
pub async fn available_slots(
    State(state): State<Arc<ApiState>>,
    _caller: AuthUser,
    path: Result<Path<(Uuid, String)>, PathRejection>,
    query: Result<Query<SlotQuery>, QueryRejection>,
) -> Result<Json<AvailableSlotsResponse>, AppError> {
    let Path((doctor_id, date)) = path?;
    let Query(query) = query?;
    let granularity = query.granularity.unwrap_or(state.slot_granularity_minutes);
    debug!(
        "Available slots requested for doctor {} on {} every {} minutes",
        doctor_id, date, granularity
    );

    let slots = state
        .slots
        .compute_available_slots(doctor_id, &date, granularity)
        .await?;

    Ok(Json(AvailableSlotsResponse {
        available_slots: slots.iter().map(ToString::to_string).collect(),
    }))
}
