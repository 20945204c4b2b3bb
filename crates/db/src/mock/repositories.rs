use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use clinicbook_core::{
    models::{
        appointment::AppointmentStatus,
        schedule::{DayOfWeek, WeeklySchedule},
    },
    repositories::{AppointmentRepository, WeeklyScheduleRepository},
};
use mockall::mock;
use uuid::Uuid;

// Mock repositories for testing
mock! {
    pub ScheduleRepo {}

    #[async_trait]
    impl WeeklyScheduleRepository for ScheduleRepo {
        async fn get_weekly_schedule(
            &self,
            doctor_id: Uuid,
            day_of_week: DayOfWeek,
        ) -> eyre::Result<Option<WeeklySchedule>>;
    }
}

mock! {
    pub AppointmentRepo {}

    #[async_trait]
    impl AppointmentRepository for AppointmentRepo {
        async fn list_occupied_times(
            &self,
            doctor_id: Uuid,
            date: NaiveDate,
            statuses: Vec<AppointmentStatus>,
        ) -> eyre::Result<HashSet<NaiveTime>>;
    }
}
