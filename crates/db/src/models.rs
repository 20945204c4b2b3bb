use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clinicbook_core::models::{
    account::User,
    appointment::Appointment,
    doctor::Doctor,
    schedule::WeeklySchedule,
    service::Service,
};
use eyre::{eyre, Report};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDoctor {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub specialty: String,
    pub license_number: String,
    pub years_experience: i32,
    pub consultation_fee: String,
    pub education: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWeeklySchedule {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbService {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub service_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: String,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbUser> for User {
    type Error = Report;

    fn try_from(row: DbUser) -> Result<Self, Self::Error> {
        Ok(User {
            role: row.role.parse().map_err(|e: String| eyre!(e))?,
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            address: row.address,
            date_of_birth: row.date_of_birth,
            created_at: row.created_at,
        })
    }
}

impl From<DbDoctor> for Doctor {
    fn from(row: DbDoctor) -> Self {
        Doctor {
            id: row.id,
            profile_id: row.profile_id,
            specialty: row.specialty,
            license_number: row.license_number,
            years_experience: row.years_experience,
            consultation_fee: row.consultation_fee,
            education: row.education,
            bio: row.bio,
            avatar_url: row.avatar_url,
            is_available: row.is_available,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<DbWeeklySchedule> for WeeklySchedule {
    type Error = Report;

    fn try_from(row: DbWeeklySchedule) -> Result<Self, Self::Error> {
        Ok(WeeklySchedule {
            day_of_week: row.day_of_week.parse().map_err(|e: String| eyre!(e))?,
            id: row.id,
            doctor_id: row.doctor_id,
            start_time: row.start_time,
            end_time: row.end_time,
            is_available: row.is_available,
            created_at: row.created_at,
        })
    }
}

impl From<DbService> for Service {
    fn from(row: DbService) -> Self {
        Service {
            id: row.id,
            name: row.name,
            description: row.description,
            duration_minutes: row.duration_minutes,
            price: row.price,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = Report;

    fn try_from(row: DbAppointment) -> Result<Self, Self::Error> {
        Ok(Appointment {
            status: row.status.parse().map_err(|e: String| eyre!(e))?,
            id: row.id,
            patient_id: row.patient_id,
            doctor_id: row.doctor_id,
            service_id: row.service_id,
            appointment_date: row.appointment_date,
            appointment_time: row.appointment_time,
            symptoms: row.symptoms,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
