//! # Data Models
//!
//! SeaORM entities used by the employee repositories.

pub mod employee;

pub use employee::Entity as Employee;
