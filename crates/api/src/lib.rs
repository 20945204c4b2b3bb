//! # ClinicBook API
//!
//! The API crate provides the web server for the ClinicBook booking service.
//! It exposes RESTful endpoints for accounts, doctors, services, appointments
//! and available-slot queries.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Provide cross-cutting concerns like authentication and error handling
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database interactions.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for authentication, logging, and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::Router;
use clinicbook_core::{
    clock::{Clock, SystemClock},
    slots::SlotCalculator,
};
use clinicbook_db::repositories::{
    appointment::PgAppointmentRepository, schedule::PgWeeklyScheduleRepository,
};
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::middleware::auth::AuthSettings;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// JWT signing key and token lifetimes
    pub auth: AuthSettings,
    /// Source of "today" for date validation
    pub clock: Arc<dyn Clock>,
    /// Available-slot calculator wired to its repositories
    pub slots: SlotCalculator,
    /// Slot spacing used when a request does not pass one
    pub slot_granularity_minutes: u32,
}

impl ApiState {
    /// Wires the PostgreSQL repositories and the system clock into the slot calculator.
    pub fn new(db_pool: PgPool, auth: AuthSettings, slot_granularity_minutes: u32) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let slots = SlotCalculator::new(
            Arc::new(PgWeeklyScheduleRepository::new(db_pool.clone())),
            Arc::new(PgAppointmentRepository::new(db_pool.clone())),
            clock.clone(),
        );

        Self {
            db_pool,
            auth,
            clock,
            slots,
            slot_granularity_minutes,
        }
    }
}

/// Builds the application router with all routes attached to `state`.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Registration, login and profile endpoints
        .merge(routes::accounts::routes())
        // Doctor directory and weekly schedules
        .merge(routes::doctors::routes())
        // Service catalogue
        .merge(routes::services::routes())
        // Booking and available-slot endpoints
        .merge(routes::appointments::routes())
        // Attach shared state to all routes
        .with_state(state)
}

/// Starts the API server with the provided configuration and database connection
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// let config = clinicbook_api::config::ApiConfig::from_env()?;
/// let db_pool = clinicbook_db::create_pool(&config.database_url, config.database_max_connections).await?;
/// clinicbook_api::start_server(config, db_pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let auth = AuthSettings::new(
        config.jwt_secret.clone(),
        chrono::Duration::minutes(config.access_token_ttl_minutes),
        chrono::Duration::days(config.refresh_token_ttl_days),
    );
    let state = Arc::new(ApiState::new(db_pool, auth, config.slot_granularity_minutes));

    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| origin.parse())
            .collect::<Result<Vec<axum::http::HeaderValue>, _>>()?;
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::PATCH,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request tracing and timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
