pub mod accounts;
pub mod appointments;
pub mod doctors;
pub mod health;
pub mod services;
