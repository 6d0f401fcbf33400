//! Trainee assessment and club recruitment.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
