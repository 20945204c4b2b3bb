use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::validate_amount;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_duration")]
    pub duration_minutes: i32,
    #[serde(default = "default_price")]
    pub price: String,
}

impl CreateServiceRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Service name is required".to_string());
        }
        if self.duration_minutes <= 0 {
            return Err("Duration must be a positive number of minutes".to_string());
        }
        validate_amount("Price", &self.price)
    }
}

fn default_duration() -> i32 {
    30
}

fn default_price() -> String {
    "0.00".to_string()
}
