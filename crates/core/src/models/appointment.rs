use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ClinicError, ClinicResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Statuses that hold on to their slot.
    pub const OCCUPYING: [AppointmentStatus; 2] =
        [AppointmentStatus::Pending, AppointmentStatus::Confirmed];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn occupies_slot(&self) -> bool {
        Self::OCCUPYING.contains(self)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("Unknown appointment status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub service_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking payload. The time arrives as an `HH:MM` string and is parsed by the handler
/// so that a malformed value yields a readable validation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: Uuid,
    pub service_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    /// Rejects bookings before `today` and returns the parsed start time.
    pub fn validate(&self, today: NaiveDate) -> ClinicResult<NaiveTime> {
        reject_past_date(self.appointment_date, today)?;
        parse_appointment_time(&self.appointment_time).map_err(ClinicError::Validation)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<String>,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
}

impl UpdateAppointmentRequest {
    /// Checks a change against `today` and returns the parsed start time, if one was sent.
    ///
    /// `by_staff` is true for the booked doctor or an admin. Patients may only cancel.
    pub fn validate(&self, today: NaiveDate, by_staff: bool) -> ClinicResult<Option<NaiveTime>> {
        if let Some(date) = self.appointment_date {
            reject_past_date(date, today)?;
        }
        if let Some(status) = self.status {
            if !by_staff && status != AppointmentStatus::Cancelled {
                return Err(ClinicError::Authorization(
                    "Patients can only cancel their appointments".to_string(),
                ));
            }
        }

        self.appointment_time
            .as_deref()
            .map(parse_appointment_time)
            .transpose()
            .map_err(ClinicError::Validation)
    }
}

fn reject_past_date(date: NaiveDate, today: NaiveDate) -> ClinicResult<()> {
    if date < today {
        return Err(ClinicError::Validation(
            "Appointment date cannot be in the past".to_string(),
        ));
    }
    Ok(())
}

/// Parses an `HH:MM` appointment time.
pub fn parse_appointment_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| "Invalid time format. Use HH:MM".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsResponse {
    pub available_slots: Vec<String>,
}
