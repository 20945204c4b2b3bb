//! # ClinicBook Core
//!
//! Domain types shared by the database and API crates, together with the
//! slot availability calculator. Nothing in this crate performs I/O; storage
//! is reached through the capability traits in [`repositories`].

pub mod clock;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod slots;
