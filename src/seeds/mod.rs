//! Database seeding functionality
//!
//! One-time insertion of baseline rows into an empty employees table.

pub mod employee;

pub use employee::{SeedOutcome, baseline_employees, seed_employees};
