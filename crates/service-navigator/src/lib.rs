pub mod config;
pub mod error;
pub mod navigator;
pub mod telemetry;
