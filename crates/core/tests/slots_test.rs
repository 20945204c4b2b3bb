use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc, Duration};
use clinicbook_core::{
    clock::FixedClock,
    errors::ClinicError,
    models::{
        appointment::AppointmentStatus,
        schedule::{DayOfWeek, WeeklySchedule},
    },
    repositories::{AppointmentRepository, WeeklyScheduleRepository},
    slots::{slot_grid, Slot, SlotCalculator, SlotError, DEFAULT_GRANULARITY_MINUTES},
};
use mockall::{mock, predicate};
use pretty_assertions::assert_eq;
use rstest::rstest;
use uuid::Uuid;

mock! {
    pub Schedules {}

    #[async_trait]
    impl WeeklyScheduleRepository for Schedules {
        async fn get_weekly_schedule(
            &self,
            doctor_id: Uuid,
            day_of_week: DayOfWeek,
        ) -> eyre::Result<Option<WeeklySchedule>>;
    }
}

mock! {
    pub Appointments {}

    #[async_trait]
    impl AppointmentRepository for Appointments {
        async fn list_occupied_times(
            &self,
            doctor_id: Uuid,
            date: NaiveDate,
            statuses: Vec<AppointmentStatus>,
        ) -> eyre::Result<HashSet<NaiveTime>>;
    }
}

/// Appointment store that honours the requested statuses, like the SQL query does.
struct InMemoryAppointments {
    rows: Vec<(NaiveTime, AppointmentStatus)>,
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointments {
    async fn list_occupied_times(
        &self,
        _doctor_id: Uuid,
        _date: NaiveDate,
        statuses: Vec<AppointmentStatus>,
    ) -> eyre::Result<HashSet<NaiveTime>> {
        Ok(self
            .rows
            .iter()
            .filter(|(_, status)| statuses.contains(status))
            .map(|(time, _)| *time)
            .collect())
    }
}

fn time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M").unwrap()
}

// 2024-01-01 is a Monday.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn schedule(doctor_id: Uuid, start: &str, end: &str, is_available: bool) -> WeeklySchedule {
    WeeklySchedule {
        id: Uuid::new_v4(),
        doctor_id,
        day_of_week: DayOfWeek::Monday,
        start_time: time(start),
        end_time: time(end),
        is_available,
        created_at: Utc::now(),
    }
}

fn schedules_returning(row: Option<WeeklySchedule>) -> MockSchedules {
    let mut schedules = MockSchedules::new();
    schedules
        .expect_get_weekly_schedule()
        .returning(move |_, _| Ok(row.clone()));
    schedules
}

fn calculator(
    schedules: impl WeeklyScheduleRepository + 'static,
    appointments: impl AppointmentRepository + 'static,
) -> SlotCalculator {
    SlotCalculator::new(
        Arc::new(schedules),
        Arc::new(appointments),
        Arc::new(FixedClock(monday())),
    )
}

fn labels(slots: &[Slot]) -> Vec<String> {
    slots.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn test_free_window_yields_every_grid_slot() {
    let doctor_id = Uuid::new_v4();
    let calc = calculator(
        schedules_returning(Some(schedule(doctor_id, "09:00", "10:00", true))),
        InMemoryAppointments { rows: vec![] },
    );

    let slots = calc
        .compute_available_slots(doctor_id, "2024-01-01", DEFAULT_GRANULARITY_MINUTES)
        .await
        .unwrap();

    assert_eq!(labels(&slots), vec!["09:00", "09:30"]);
}

#[rstest]
#[case(AppointmentStatus::Pending, vec!["09:00"])]
#[case(AppointmentStatus::Confirmed, vec!["09:00"])]
#[case(AppointmentStatus::Cancelled, vec!["09:00", "09:30"])]
#[case(AppointmentStatus::Completed, vec!["09:00", "09:30"])]
#[tokio::test]
async fn test_only_pending_and_confirmed_occupy(
    #[case] status: AppointmentStatus,
    #[case] expected: Vec<&str>,
) {
    let doctor_id = Uuid::new_v4();
    let calc = calculator(
        schedules_returning(Some(schedule(doctor_id, "09:00", "10:00", true))),
        InMemoryAppointments {
            rows: vec![(time("09:30"), status)],
        },
    );

    let slots = calc
        .compute_available_slots(doctor_id, "2024-01-01", 30)
        .await
        .unwrap();

    assert_eq!(labels(&slots), expected);
}

#[tokio::test]
async fn test_malformed_date_fails_before_any_lookup() {
    let mut schedules = MockSchedules::new();
    schedules.expect_get_weekly_schedule().times(0);
    let mut appointments = MockAppointments::new();
    appointments.expect_list_occupied_times().times(0);

    let result = calculator(schedules, appointments)
        .compute_available_slots(Uuid::new_v4(), "2024/01/01", 30)
        .await;

    match result {
        Err(SlotError::InvalidDateFormat(input)) => assert_eq!(input, "2024/01/01"),
        other => panic!("Expected InvalidDateFormat, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_past_date_fails_regardless_of_schedule() {
    let mut schedules = MockSchedules::new();
    schedules.expect_get_weekly_schedule().times(0);
    let mut appointments = MockAppointments::new();
    appointments.expect_list_occupied_times().times(0);

    let result = calculator(schedules, appointments)
        .compute_available_slots(Uuid::new_v4(), "2023-12-31", 30)
        .await;

    assert!(matches!(result, Err(SlotError::PastDate(d)) if d == monday() - Duration::days(1)));
}

#[tokio::test]
async fn test_today_is_accepted() {
    let doctor_id = Uuid::new_v4();
    let calc = calculator(
        schedules_returning(Some(schedule(doctor_id, "09:00", "09:30", true))),
        InMemoryAppointments { rows: vec![] },
    );

    let slots = calc
        .compute_available_slots(doctor_id, "2024-01-01", 30)
        .await
        .unwrap();

    assert_eq!(labels(&slots), vec!["09:00"]);
}

#[tokio::test]
async fn test_missing_schedule_reports_unavailable_without_appointment_lookup() {
    let mut appointments = MockAppointments::new();
    appointments.expect_list_occupied_times().times(0);

    let result = calculator(schedules_returning(None), appointments)
        .compute_available_slots(Uuid::new_v4(), "2024-01-01", 30)
        .await;

    assert!(matches!(
        result,
        Err(SlotError::DoctorUnavailableOnDay(DayOfWeek::Monday))
    ));
}

#[tokio::test]
async fn test_schedule_marked_unavailable_reports_unavailable() {
    let doctor_id = Uuid::new_v4();
    let mut appointments = MockAppointments::new();
    appointments.expect_list_occupied_times().times(0);

    let result = calculator(
        schedules_returning(Some(schedule(doctor_id, "09:00", "17:00", false))),
        appointments,
    )
    .compute_available_slots(doctor_id, "2024-01-01", 30)
    .await;

    assert!(matches!(result, Err(SlotError::DoctorUnavailableOnDay(_))));
}

#[tokio::test]
async fn test_empty_window_is_not_an_error() {
    let doctor_id = Uuid::new_v4();
    let calc = calculator(
        schedules_returning(Some(schedule(doctor_id, "09:00", "09:00", true))),
        InMemoryAppointments { rows: vec![] },
    );

    let slots = calc
        .compute_available_slots(doctor_id, "2024-01-01", 30)
        .await
        .unwrap();

    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_zero_granularity_is_rejected() {
    let mut schedules = MockSchedules::new();
    schedules.expect_get_weekly_schedule().times(0);

    let result = calculator(schedules, InMemoryAppointments { rows: vec![] })
        .compute_available_slots(Uuid::new_v4(), "2024-01-01", 0)
        .await;

    assert!(matches!(result, Err(SlotError::InvalidGranularity)));
}

#[rstest]
#[case("2024-01-01", DayOfWeek::Monday)]
#[case("2024-01-03", DayOfWeek::Wednesday)]
#[case("2024-01-06", DayOfWeek::Saturday)]
#[case("2024-01-07", DayOfWeek::Sunday)]
#[tokio::test]
async fn test_schedule_lookup_uses_date_weekday(#[case] date: &str, #[case] expected: DayOfWeek) {
    let doctor_id = Uuid::new_v4();
    let mut schedules = MockSchedules::new();
    schedules
        .expect_get_weekly_schedule()
        .with(predicate::eq(doctor_id), predicate::eq(expected))
        .times(1)
        .returning(|_, _| Ok(None));

    let result = calculator(schedules, InMemoryAppointments { rows: vec![] })
        .compute_available_slots(doctor_id, date, 30)
        .await;

    assert!(matches!(result, Err(SlotError::DoctorUnavailableOnDay(day)) if day == expected));
}

#[tokio::test]
async fn test_occupied_lookup_requests_pending_and_confirmed() {
    let doctor_id = Uuid::new_v4();
    let mut appointments = MockAppointments::new();
    appointments
        .expect_list_occupied_times()
        .with(
            predicate::eq(doctor_id),
            predicate::eq(monday()),
            predicate::eq(vec![AppointmentStatus::Pending, AppointmentStatus::Confirmed]),
        )
        .times(1)
        .returning(|_, _, _| Ok(HashSet::from([NaiveTime::from_hms_opt(9, 0, 0).unwrap()])));

    let slots = calculator(
        schedules_returning(Some(schedule(doctor_id, "09:00", "10:00", true))),
        appointments,
    )
    .compute_available_slots(doctor_id, "2024-01-01", 30)
    .await
    .unwrap();

    assert_eq!(labels(&slots), vec!["09:30"]);
}

#[tokio::test]
async fn test_repeated_queries_return_identical_results() {
    let doctor_id = Uuid::new_v4();
    let calc = calculator(
        schedules_returning(Some(schedule(doctor_id, "08:00", "12:00", true))),
        InMemoryAppointments {
            rows: vec![(time("10:00"), AppointmentStatus::Confirmed)],
        },
    );

    let first = calc
        .compute_available_slots(doctor_id, "2024-01-08", 30)
        .await
        .unwrap();
    let second = calc
        .compute_available_slots(doctor_id, "2024-01-08", 30)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 7);
}

#[tokio::test]
async fn test_repository_failure_surfaces_as_database_error() {
    let mut schedules = MockSchedules::new();
    schedules
        .expect_get_weekly_schedule()
        .returning(|_, _| Err(eyre::eyre!("connection reset")));

    let err = calculator(schedules, InMemoryAppointments { rows: vec![] })
        .compute_available_slots(Uuid::new_v4(), "2024-01-01", 30)
        .await
        .unwrap_err();

    assert!(matches!(err, SlotError::Repository(_)));
    assert!(matches!(ClinicError::from(err), ClinicError::Database(_)));
}

#[rstest]
#[case("09:00", "10:00", 30, 2)]
#[case("09:00", "10:15", 30, 2)]
#[case("09:00", "17:00", 30, 16)]
#[case("09:00", "10:00", 45, 1)]
#[case("09:00", "10:00", 15, 4)]
#[case("08:00", "08:20", 30, 0)]
#[case("10:00", "09:00", 30, 0)]
fn test_grid_length_drops_partial_trailing_slot(
    #[case] start: &str,
    #[case] end: &str,
    #[case] minutes: i64,
    #[case] expected: usize,
) {
    let slots = slot_grid(time(start), time(end), Duration::minutes(minutes), &HashSet::new());

    assert_eq!(slots.len(), expected);
    if let Some(first) = slots.first() {
        assert_eq!(first.start(), time(start));
    }
    for pair in slots.windows(2) {
        assert_eq!(pair[1].start() - pair[0].start(), Duration::minutes(minutes));
    }
}

#[test]
fn test_grid_subtracts_only_aligned_occupied_times() {
    let occupied = HashSet::from([time("10:00"), time("11:30"), time("10:15")]);

    let slots = slot_grid(time("09:00"), time("12:00"), Duration::minutes(30), &occupied);

    assert_eq!(labels(&slots), vec!["09:00", "09:30", "10:30", "11:00"]);
}

#[test]
fn test_grid_does_not_wrap_past_midnight() {
    let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap();

    let slots = slot_grid(time("23:00"), end, Duration::minutes(30), &HashSet::new());

    assert_eq!(labels(&slots), vec!["23:00"]);
}

#[test]
fn test_slot_serializes_as_hour_minute() {
    let slots = vec![Slot::new(time("09:00")), Slot::new(time("14:30"))];

    let json = serde_json::to_string(&slots).unwrap();

    assert_eq!(json, r#"["09:00","14:30"]"#);
}

#[rstest]
#[case(SlotError::InvalidDateFormat("x".to_string()), "Invalid date format. Use YYYY-MM-DD")]
#[case(SlotError::PastDate(monday()), "Date cannot be in the past")]
#[case(SlotError::DoctorUnavailableOnDay(DayOfWeek::Sunday), "Doctor not available on this day")]
fn test_slot_errors_become_validation_errors(#[case] err: SlotError, #[case] message: &str) {
    match ClinicError::from(err) {
        ClinicError::Validation(msg) => assert_eq!(msg, message),
        other => panic!("Expected Validation error, got: {:?}", other),
    }
}
