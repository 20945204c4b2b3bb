//! # Slot Availability
//!
//! Computes the free appointment start times for one doctor on one date.
//!
//! ## Algorithm
//!
//! 1. Parse the requested date (`YYYY-MM-DD`) and reject dates before today
//! 2. Map the date to its weekday and load the doctor's weekly schedule row
//! 3. Load the times already held by pending or confirmed appointments
//! 4. Walk the `[start_time, end_time)` window in fixed steps, keeping every
//!    step that fits entirely inside the window and is not occupied
//!
//! Input validation happens before any repository call, and the appointment
//! lookup only happens once a usable schedule has been found.
//!
//! The result is a snapshot. Nothing is locked, so a slot reported as free can
//! be booked by a concurrent request before the caller acts on it.

use std::{collections::HashSet, fmt, sync::Arc};

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
    clock::Clock,
    errors::ClinicError,
    models::{
        appointment::AppointmentStatus,
        schedule::DayOfWeek,
    },
    repositories::{AppointmentRepository, WeeklyScheduleRepository},
};

pub const DEFAULT_GRANULARITY_MINUTES: u32 = 30;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("Date cannot be in the past")]
    PastDate(NaiveDate),

    #[error("Doctor not available on this day")]
    DoctorUnavailableOnDay(DayOfWeek),

    #[error("Slot granularity must be a positive number of minutes")]
    InvalidGranularity,

    #[error("Repository error: {0}")]
    Repository(#[from] eyre::Report),
}

impl From<SlotError> for ClinicError {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::Repository(report) => ClinicError::Database(report),
            other => ClinicError::Validation(other.to_string()),
        }
    }
}

/// A free appointment start time. Serializes as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(NaiveTime);

impl Slot {
    pub fn new(start: NaiveTime) -> Self {
        Self(start)
    }

    pub fn start(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses a `YYYY-MM-DD` date string.
pub fn parse_date(value: &str) -> Result<NaiveDate, SlotError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| SlotError::InvalidDateFormat(value.to_string()))
}

/// Lays a fixed grid over `[start, end)` and drops occupied starts.
///
/// A step is kept only if it ends at or before `end`, so a trailing remainder
/// shorter than `step` never appears. Steps that would cross midnight end the
/// walk instead of wrapping into the same day.
pub fn slot_grid(
    start: NaiveTime,
    end: NaiveTime,
    step: Duration,
    occupied: &HashSet<NaiveTime>,
) -> Vec<Slot> {
    let mut slots = Vec::new();
    if step <= Duration::zero() {
        return slots;
    }

    let mut current = start;
    while current < end {
        let (next, overflow) = current.overflowing_add_signed(step);
        if overflow != 0 || next > end {
            break;
        }
        if !occupied.contains(&current) {
            slots.push(Slot(current));
        }
        current = next;
    }
    slots
}

/// Computes free slots from injected schedule and appointment repositories.
#[derive(Clone)]
pub struct SlotCalculator {
    schedules: Arc<dyn WeeklyScheduleRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    clock: Arc<dyn Clock>,
}

impl SlotCalculator {
    pub fn new(
        schedules: Arc<dyn WeeklyScheduleRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            schedules,
            appointments,
            clock,
        }
    }

    /// Returns the doctor's free slots on `date` in ascending order.
    ///
    /// # Errors
    ///
    /// * `SlotError::InvalidDateFormat` - `date` is not `YYYY-MM-DD`
    /// * `SlotError::PastDate` - `date` is before today
    /// * `SlotError::InvalidGranularity` - `granularity_minutes` is zero
    /// * `SlotError::DoctorUnavailableOnDay` - no available schedule row for that weekday
    /// * `SlotError::Repository` - a storage lookup failed
    pub async fn compute_available_slots(
        &self,
        doctor_id: Uuid,
        date: &str,
        granularity_minutes: u32,
    ) -> Result<Vec<Slot>, SlotError> {
        let date = parse_date(date)?;
        if date < self.clock.today() {
            return Err(SlotError::PastDate(date));
        }
        if granularity_minutes == 0 {
            return Err(SlotError::InvalidGranularity);
        }

        let day_of_week = DayOfWeek::from(date.weekday());
        let schedule = self
            .schedules
            .get_weekly_schedule(doctor_id, day_of_week)
            .await?
            .filter(|schedule| schedule.is_available)
            .ok_or(SlotError::DoctorUnavailableOnDay(day_of_week))?;

        let occupied = self
            .appointments
            .list_occupied_times(doctor_id, date, AppointmentStatus::OCCUPYING.to_vec())
            .await?;

        let slots = slot_grid(
            schedule.start_time,
            schedule.end_time,
            Duration::minutes(i64::from(granularity_minutes)),
            &occupied,
        );

        debug!(
            "Computed {} free slots for doctor {} on {} ({} occupied)",
            slots.len(),
            doctor_id,
            date,
            occupied.len()
        );

        Ok(slots)
    }
}
