//! Database seeding
//!
//! Named seeders declare the tables they own and the seeders they depend on.
//! The manager resolves a dependency order, empties owned tables, then seeds.

pub mod manager;
pub mod seeder;

pub use manager::SeederManager;
pub use seeder::{Seeder, SqlSeeder};
