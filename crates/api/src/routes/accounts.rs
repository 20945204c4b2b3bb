use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/auth/register", post(handlers::accounts::register))
        .route("/api/auth/login", post(handlers::accounts::login))
        .route("/api/auth/refresh", post(handlers::accounts::refresh))
        .route(
            "/api/auth/profile",
            get(handlers::accounts::get_profile).put(handlers::accounts::update_profile),
        )
        .route("/api/auth/user", get(handlers::accounts::get_profile))
}
