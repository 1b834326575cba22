//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for external services like object storage and metrics.

pub mod metrics;
pub mod storage;
