use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{account::UserProfileResponse, money::validate_amount, schedule::ScheduleResponse};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub specialty: String,
    pub license_number: String,
    pub years_experience: i32,
    /// Decimal amount kept as a string to avoid float rounding, e.g. `"45.00"`.
    pub consultation_fee: String,
    pub education: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub profile_id: Uuid,
    pub specialty: String,
    pub license_number: String,
    #[serde(default)]
    pub years_experience: i32,
    #[serde(default = "default_fee")]
    pub consultation_fee: String,
    pub education: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl CreateDoctorRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.specialty.trim().is_empty() {
            return Err("Specialty is required".to_string());
        }
        if self.license_number.trim().is_empty() {
            return Err("License number is required".to_string());
        }
        if self.years_experience < 0 {
            return Err("Years of experience cannot be negative".to_string());
        }
        validate_amount("Consultation fee", &self.consultation_fee)
    }
}

fn default_fee() -> String {
    "0.00".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorResponse {
    pub id: Uuid,
    pub profile: UserProfileResponse,
    pub specialty: String,
    pub license_number: String,
    pub years_experience: i32,
    pub consultation_fee: String,
    pub education: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_available: bool,
    pub schedules: Vec<ScheduleResponse>,
}

impl DoctorResponse {
    pub fn new(
        doctor: Doctor,
        profile: UserProfileResponse,
        schedules: Vec<ScheduleResponse>,
    ) -> Self {
        Self {
            id: doctor.id,
            profile,
            specialty: doctor.specialty,
            license_number: doctor.license_number,
            years_experience: doctor.years_experience,
            consultation_fee: doctor.consultation_fee,
            education: doctor.education,
            bio: doctor.bio,
            avatar_url: doctor.avatar_url,
            is_available: doctor.is_available,
            schedules,
        }
    }
}
