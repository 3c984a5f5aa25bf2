//! Data models for the HTTP probe

pub mod config;
pub mod metrics;

pub use config::ProbeConfig;
pub use metrics::{transfer_rate, ProbeReport, Timings};
