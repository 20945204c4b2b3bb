use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/doctors",
            get(handlers::doctors::list_doctors).post(handlers::doctors::create_doctor),
        )
        .route("/api/doctors/:id", get(handlers::doctors::get_doctor))
        .route(
            "/api/doctors/:id/schedules",
            get(handlers::doctors::list_doctor_schedules),
        )
        .route(
            "/api/doctors/:id/schedules/:day",
            put(handlers::doctors::upsert_schedule),
        )
}
