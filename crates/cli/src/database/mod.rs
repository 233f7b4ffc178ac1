//! Application migrations and seeders

pub mod migrations;
pub mod seeders;
