pub mod accounts;
pub mod config;
pub mod corridor;
pub mod error;
pub mod http;
pub mod scoring;
pub mod telemetry;
