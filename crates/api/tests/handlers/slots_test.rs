use std::collections::HashSet;

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use chrono::{NaiveTime, Utc};
use clinicbook_core::models::{
    account::UserRole,
    appointment::{AppointmentStatus, AvailableSlotsResponse},
    schedule::{DayOfWeek, WeeklySchedule},
};
use mockall::predicate::{always, eq};
use pretty_assertions::assert_eq;
use serde_json::Value;
use uuid::Uuid;

use crate::test_utils::{access_token, bearer, TestContext};

fn time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M").unwrap()
}

fn monday_schedule(doctor_id: Uuid, start: &str, end: &str) -> WeeklySchedule {
    WeeklySchedule {
        id: Uuid::new_v4(),
        doctor_id,
        day_of_week: DayOfWeek::Monday,
        start_time: time(start),
        end_time: time(end),
        is_available: true,
        created_at: Utc::now(),
    }
}

fn auth_header() -> HeaderValue {
    HeaderValue::from_str(&bearer(&access_token(UserRole::Patient))).unwrap()
}

fn slots_path(doctor_id: Uuid, date: &str) -> String {
    format!("/api/appointments/doctors/{}/available-slots/{}", doctor_id, date)
}

#[tokio::test]
async fn test_available_slots_skip_booked_times() {
    let doctor_id = Uuid::new_v4();
    let mut ctx = TestContext::new();

    ctx.schedule_repo
        .expect_get_weekly_schedule()
        .with(eq(doctor_id), eq(DayOfWeek::Monday))
        .times(1)
        .returning(move |id, _| Ok(Some(monday_schedule(id, "09:00", "11:00"))));
    ctx.appointment_repo
        .expect_list_occupied_times()
        .with(eq(doctor_id), always(), eq(AppointmentStatus::OCCUPYING.to_vec()))
        .times(1)
        .returning(|_, _, _| Ok(HashSet::from([time("09:30")])));

    let server = ctx.build_server();
    let response = server
        .get(&slots_path(doctor_id, "2024-01-08"))
        .add_header(AUTHORIZATION, auth_header())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<AvailableSlotsResponse>();
    assert_eq!(body.available_slots, vec!["09:00", "10:00", "10:30"]);
}

#[tokio::test]
async fn test_available_slots_honour_granularity_query() {
    let doctor_id = Uuid::new_v4();
    let mut ctx = TestContext::new();

    ctx.schedule_repo
        .expect_get_weekly_schedule()
        .returning(move |id, _| Ok(Some(monday_schedule(id, "09:00", "10:00"))));
    ctx.appointment_repo
        .expect_list_occupied_times()
        .returning(|_, _, _| Ok(HashSet::new()));

    let server = ctx.build_server();
    let response = server
        .get(&slots_path(doctor_id, "2024-01-01"))
        .add_query_param("granularity", 15)
        .add_header(AUTHORIZATION, auth_header())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<AvailableSlotsResponse>();
    assert_eq!(body.available_slots, vec!["09:00", "09:15", "09:30", "09:45"]);
}

#[tokio::test]
async fn test_available_slots_reject_zero_granularity() {
    let mut ctx = TestContext::new();
    ctx.schedule_repo.expect_get_weekly_schedule().times(0);
    ctx.appointment_repo.expect_list_occupied_times().times(0);

    let server = ctx.build_server();
    let response = server
        .get(&slots_path(Uuid::new_v4(), "2024-01-01"))
        .add_query_param("granularity", 0)
        .add_header(AUTHORIZATION, auth_header())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(
        body["error"],
        "Slot granularity must be a positive number of minutes"
    );
}

#[tokio::test]
async fn test_available_slots_reject_non_numeric_granularity() {
    let mut ctx = TestContext::new();
    ctx.schedule_repo.expect_get_weekly_schedule().times(0);
    ctx.appointment_repo.expect_list_occupied_times().times(0);

    let server = ctx.build_server();
    let response = server
        .get(&slots_path(Uuid::new_v4(), "2024-01-01"))
        .add_query_param("granularity", "abc")
        .add_header(AUTHORIZATION, auth_header())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Failed to deserialize query string"), "{}", message);
}

#[tokio::test]
async fn test_available_slots_reject_malformed_doctor_id() {
    let mut ctx = TestContext::new();
    ctx.schedule_repo.expect_get_weekly_schedule().times(0);
    ctx.appointment_repo.expect_list_occupied_times().times(0);

    let server = ctx.build_server();
    let response = server
        .get("/api/appointments/doctors/not-a-uuid/available-slots/2024-01-01")
        .add_header(AUTHORIZATION, auth_header())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Invalid URL"), "{}", message);
}

#[tokio::test]
async fn test_available_slots_reject_bad_date() {
    let mut ctx = TestContext::new();
    ctx.schedule_repo.expect_get_weekly_schedule().times(0);
    ctx.appointment_repo.expect_list_occupied_times().times(0);

    let server = ctx.build_server();
    let response = server
        .get(&slots_path(Uuid::new_v4(), "01-08-2024"))
        .add_header(AUTHORIZATION, auth_header())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(
        body["error"],
        "Invalid date format. Use YYYY-MM-DD"
    );
}

#[tokio::test]
async fn test_available_slots_reject_past_date() {
    let mut ctx = TestContext::new();
    ctx.schedule_repo.expect_get_weekly_schedule().times(0);
    ctx.appointment_repo.expect_list_occupied_times().times(0);

    let server = ctx.build_server();
    let response = server
        .get(&slots_path(Uuid::new_v4(), "2023-12-31"))
        .add_header(AUTHORIZATION, auth_header())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "Date cannot be in the past");
}

#[tokio::test]
async fn test_available_slots_doctor_off_that_day() {
    let mut ctx = TestContext::new();
    ctx.schedule_repo
        .expect_get_weekly_schedule()
        .with(always(), eq(DayOfWeek::Tuesday))
        .returning(|_, _| Ok(None));
    ctx.appointment_repo.expect_list_occupied_times().times(0);

    let server = ctx.build_server();
    let response = server
        .get(&slots_path(Uuid::new_v4(), "2024-01-02"))
        .add_header(AUTHORIZATION, auth_header())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "Doctor not available on this day");
}

#[tokio::test]
async fn test_available_slots_storage_failure_is_internal_error() {
    let mut ctx = TestContext::new();
    ctx.schedule_repo
        .expect_get_weekly_schedule()
        .returning(|_, _| Err(eyre::eyre!("connection reset")));

    let server = ctx.build_server();
    let response = server
        .get(&slots_path(Uuid::new_v4(), "2024-01-01"))
        .add_header(AUTHORIZATION, auth_header())
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_available_slots_require_token() {
    let mut ctx = TestContext::new();
    ctx.schedule_repo.expect_get_weekly_schedule().times(0);

    let server = ctx.build_server();
    let response = server.get(&slots_path(Uuid::new_v4(), "2024-01-01")).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body = response.json::<Value>();
    assert_eq!(
        body["error"],
        "Missing authorization header"
    );
}

#[tokio::test]
async fn test_available_slots_reject_refresh_token() {
    let ctx = TestContext::new();
    let refresh = crate::test_utils::auth_settings()
        .issue_token(
            Uuid::new_v4(),
            "someone@example.com",
            UserRole::Patient,
            clinicbook_api::middleware::auth::TokenKind::Refresh,
            Utc::now(),
        )
        .unwrap();

    let server = ctx.build_server();
    let response = server
        .get(&slots_path(Uuid::new_v4(), "2024-01-01"))
        .add_header(AUTHORIZATION, HeaderValue::from_str(&bearer(&refresh)).unwrap())
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
