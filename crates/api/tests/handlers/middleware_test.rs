use axum::{body::to_bytes, http::StatusCode};
use chrono::{Duration, Utc};
use clinicbook_api::middleware::{
    auth::{self, AuthSettings, TokenKind},
    error_handling::{map_error, AppError},
};
use clinicbook_core::{
    errors::ClinicError,
    models::account::{User, UserRole},
    slots::SlotError,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;
use uuid::Uuid;

use crate::test_utils::{auth_settings, TEST_SECRET};

#[rstest]
#[case::not_found(ClinicError::NotFound("Doctor".into()), StatusCode::NOT_FOUND)]
#[case::validation(ClinicError::Validation("Bad input".into()), StatusCode::BAD_REQUEST)]
#[case::authentication(ClinicError::Authentication("No token".into()), StatusCode::UNAUTHORIZED)]
#[case::authorization(ClinicError::Authorization("Admins only".into()), StatusCode::FORBIDDEN)]
#[case::conflict(ClinicError::Conflict("Email taken".into()), StatusCode::CONFLICT)]
#[case::database(ClinicError::Database(eyre::eyre!("Database error")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case::internal(
    ClinicError::Internal(Box::new(std::io::Error::new(std::io::ErrorKind::Other, "Internal error"))),
    StatusCode::INTERNAL_SERVER_ERROR
)]
fn test_error_status_mapping(#[case] error: ClinicError, #[case] expected: StatusCode) {
    let response = map_error(error);
    assert_eq!(response.status(), expected);
}

#[tokio::test]
async fn test_error_body_carries_message() {
    let response = map_error(ClinicError::Validation("Invalid time format. Use HH:MM".into()));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["error"], "Invalid time format. Use HH:MM");
}

#[rstest]
#[case::bad_format(SlotError::InvalidDateFormat("tomorrow".into()), StatusCode::BAD_REQUEST)]
#[case::zero_granularity(SlotError::InvalidGranularity, StatusCode::BAD_REQUEST)]
#[case::storage(SlotError::Repository(eyre::eyre!("timeout")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_slot_errors_map_to_status(#[case] error: SlotError, #[case] expected: StatusCode) {
    assert_eq!(AppError::from(error).status(), expected);
}

#[test]
fn test_hash_and_verify_password() {
    let hashed = auth::hash_password("test_password").unwrap();

    assert_ne!(hashed, "test_password");
    assert!(hashed.starts_with("$argon2"));
    assert!(auth::verify_password("test_password", &hashed).unwrap());
    assert!(!auth::verify_password("wrong_password", &hashed).unwrap());
}

#[test]
fn test_hashes_are_salted() {
    let first = auth::hash_password("same").unwrap();
    let second = auth::hash_password("same").unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_verify_rejects_malformed_hash() {
    assert!(auth::verify_password("anything", "not-a-phc-string").is_err());
}

#[test_log::test]
fn test_token_round_trip() {
    let settings = auth_settings();
    let user_id = Uuid::new_v4();

    let token = settings
        .issue_token(user_id, "doc@example.com", UserRole::Doctor, TokenKind::Access, Utc::now())
        .unwrap();
    let claims = settings.decode_token(&token, TokenKind::Access).unwrap();

    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, "doc@example.com");
    assert_eq!(claims.role, UserRole::Doctor);
    assert_eq!(claims.token_type, TokenKind::Access);
    assert_eq!(claims.exp - claims.iat, 60 * 60);
}

#[test]
fn test_token_pair_kinds() {
    let settings = auth_settings();
    let user = User {
        id: Uuid::new_v4(),
        email: "pat@example.com".to_string(),
        first_name: "Pat".to_string(),
        last_name: String::new(),
        role: UserRole::Patient,
        phone: None,
        address: None,
        date_of_birth: None,
        created_at: Utc::now(),
    };

    let pair = settings.issue_token_pair(&user).unwrap();

    assert!(settings.decode_token(&pair.access, TokenKind::Access).is_ok());
    assert!(settings.decode_token(&pair.refresh, TokenKind::Refresh).is_ok());
    assert!(settings.decode_token(&pair.access, TokenKind::Refresh).is_err());
    let refresh_claims = settings.decode_token(&pair.refresh, TokenKind::Refresh).unwrap();
    assert_eq!(refresh_claims.exp - refresh_claims.iat, 7 * 24 * 60 * 60);
}

#[test]
fn test_expired_token_rejected() {
    let settings = auth_settings();
    let issued_at = Utc::now() - Duration::hours(2);

    let token = settings
        .issue_token(Uuid::new_v4(), "a@example.com", UserRole::Patient, TokenKind::Access, issued_at)
        .unwrap();

    match settings.decode_token(&token, TokenKind::Access) {
        Err(ClinicError::Authentication(message)) => {
            assert_eq!(message, "Token is invalid or expired")
        }
        other => panic!("expected authentication error, got {:?}", other),
    }
}

#[test]
fn test_wrong_token_kind_rejected() {
    let settings = auth_settings();
    let token = settings
        .issue_token(Uuid::new_v4(), "a@example.com", UserRole::Patient, TokenKind::Refresh, Utc::now())
        .unwrap();

    match settings.decode_token(&token, TokenKind::Access) {
        Err(ClinicError::Authentication(message)) => assert_eq!(message, "Token has wrong type"),
        other => panic!("expected authentication error, got {:?}", other),
    }
}

#[test]
fn test_token_signed_with_other_secret_rejected() {
    let other = AuthSettings::new(
        format!("{}-other", TEST_SECRET),
        Duration::minutes(60),
        Duration::days(7),
    );
    let token = other
        .issue_token(Uuid::new_v4(), "a@example.com", UserRole::Admin, TokenKind::Access, Utc::now())
        .unwrap();

    assert!(auth_settings().decode_token(&token, TokenKind::Access).is_err());
}
