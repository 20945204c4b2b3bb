pub mod account;
pub mod appointment;
pub mod doctor;
pub mod money;
pub mod schedule;
pub mod service;
