//! # Employees Table Initializer
//!
//! Creates or additively patches the `Employees` table on the master database
//! or on every tenant database listed in the master's registry, seeds baseline
//! rows into empty tables, and provides the employee repositories.

pub mod config;
pub mod db;
pub mod error;
pub mod initializer;
pub mod models;
pub mod reconciler;
pub mod registry;
pub mod repositories;
pub mod schema;
pub mod seeds;
pub mod telemetry;
pub use migration;
