//! Synthetic building-monitoring core: sensor telemetry, windowed
//! aggregation with bounded history, and room occupancy time accounting.

pub mod config;
pub mod models;
pub mod occupancy;
pub mod query;
pub mod registry;
pub mod storage;
pub mod telemetry;
pub mod utils;
