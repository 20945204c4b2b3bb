use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use clinicbook_core::{
    errors::ClinicError,
    models::service::{CreateServiceRequest, Service},
};
use clinicbook_db::repositories::service;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    middleware::{auth::AuthUser, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler]
pub async fn list_services(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Service>>, AppError> {
    let rows = service::list_active_services(&state.db_pool).await?;
    Ok(Json(rows.into_iter().map(Service::from).collect()))
}

#[axum::debug_handler]
pub async fn get_service(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Service>, AppError> {
    let row = service::get_active_service_by_id(&state.db_pool, id)
        .await?
        .ok_or_else(|| ClinicError::NotFound(format!("Service with ID {} not found", id)))?;

    Ok(Json(row.into()))
}

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Service>), AppError> {
    caller.require_admin()?;
    payload.validate().map_err(ClinicError::Validation)?;

    let row = service::create_service(
        &state.db_pool,
        payload.name.trim(),
        payload.description.as_deref(),
        payload.duration_minutes,
        &payload.price,
    )
    .await?;

    info!("Created service {} ({})", row.name, row.id);
    Ok((StatusCode::CREATED, Json(row.into())))
}
