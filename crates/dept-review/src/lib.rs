pub mod config;
pub mod dataset;
pub mod error;
pub mod ranking;
pub mod telemetry;
