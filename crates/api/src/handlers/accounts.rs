use axum::{extract::State, http::StatusCode, Json};
use clinicbook_core::{
    errors::ClinicError,
    models::account::{
        split_name, AccessTokenResponse, LoginRequest, RefreshRequest, RegisterRequest,
        TokenPairResponse, UpdateProfileRequest, User, UserProfileResponse,
    },
};
use clinicbook_db::repositories::user::{self, NewUser, ProfileChanges};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    middleware::{
        auth::{self, AuthUser, TokenKind},
        error_handling::AppError,
    },
    ApiState,
};

async fn load_user(state: &ApiState, id: Uuid) -> Result<User, AppError> {
    let row = user::get_user_by_id(&state.db_pool, id)
        .await?
        .ok_or_else(|| ClinicError::NotFound(format!("User with ID {} not found", id)))?;
    Ok(User::try_from(row)?)
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfileResponse>), AppError> {
    payload.validate().map_err(ClinicError::Validation)?;

    let email = payload.email.trim();
    let duplicate = || {
        AppError(ClinicError::Conflict(
            "A user with that email already exists".to_string(),
        ))
    };
    if user::get_user_by_email(&state.db_pool, email).await?.is_some() {
        return Err(duplicate());
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let (first_name, last_name) = split_name(&payload.name, email);

    let row = user::create_user(
        &state.db_pool,
        NewUser {
            email,
            password_hash: &password_hash,
            first_name: &first_name,
            last_name: &last_name,
            role: payload.role.as_str(),
            phone: payload.phone.as_deref(),
            address: payload.address.as_deref(),
            date_of_birth: payload.date_of_birth,
        },
    )
    .await
    // A concurrent registration can win the race between the lookup and the insert
    .map_err(|err| {
        if clinicbook_db::is_unique_violation(&err) {
            duplicate()
        } else {
            AppError::from(err)
        }
    })?;

    let created = User::try_from(row)?;
    info!("Registered {} account {}", created.role, created.id);

    Ok((StatusCode::CREATED, Json(created.into())))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, AppError> {
    let invalid = || {
        AppError(ClinicError::Authentication(
            "No active account found with the given credentials".to_string(),
        ))
    };

    let row = match user::get_user_by_email(&state.db_pool, payload.email.trim()).await? {
        Some(row) => row,
        None => {
            warn!("Login attempt for unknown email");
            return Err(invalid());
        }
    };

    if !auth::verify_password(&payload.password, &row.password_hash)? {
        warn!("Login attempt with wrong password for user {}", row.id);
        return Err(invalid());
    }

    let account = User::try_from(row)?;
    let tokens = state.auth.issue_token_pair(&account)?;

    Ok(Json(tokens))
}

#[axum::debug_handler]
pub async fn refresh(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let claims = state.auth.decode_token(&payload.refresh, TokenKind::Refresh)?;

    // Re-read the account so role changes take effect on refresh
    let account = load_user(&state, claims.sub).await.map_err(|_| {
        AppError(ClinicError::Authentication("User no longer exists".to_string()))
    })?;

    let access = state.auth.issue_token(
        account.id,
        &account.email,
        account.role,
        TokenKind::Access,
        chrono::Utc::now(),
    )?;

    Ok(Json(AccessTokenResponse { access }))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
) -> Result<Json<UserProfileResponse>, AppError> {
    let account = load_user(&state, caller.id).await?;
    Ok(Json(account.into()))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfileResponse>, AppError> {
    let names = payload
        .name
        .as_deref()
        .map(|name| split_name(name, &caller.email));

    let row = user::update_user_profile(
        &state.db_pool,
        caller.id,
        ProfileChanges {
            first_name: names.as_ref().map(|(first, _)| first.as_str()),
            last_name: names.as_ref().map(|(_, last)| last.as_str()),
            phone: payload.phone.as_deref(),
            address: payload.address.as_deref(),
            date_of_birth: payload.date_of_birth,
        },
    )
    .await?;

    Ok(Json(User::try_from(row)?.into()))
}
