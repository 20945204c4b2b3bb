//! Read capabilities the slot calculator needs from storage.
//!
//! The database crate implements these against PostgreSQL; tests substitute
//! mocks or in-memory fakes.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use eyre::Result;
use uuid::Uuid;

use crate::models::{appointment::AppointmentStatus, schedule::{DayOfWeek, WeeklySchedule}};

#[async_trait]
pub trait WeeklyScheduleRepository: Send + Sync {
    /// Returns the doctor's row for `day_of_week`, whether or not it is marked available.
    async fn get_weekly_schedule(
        &self,
        doctor_id: Uuid,
        day_of_week: DayOfWeek,
    ) -> Result<Option<WeeklySchedule>>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Times already claimed on `date` by appointments whose status is one of `statuses`.
    async fn list_occupied_times(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        statuses: Vec<AppointmentStatus>,
    ) -> Result<HashSet<NaiveTime>>;
}
