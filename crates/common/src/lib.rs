//! Shared types for the user aggregate engine.

pub mod error;
pub mod pagination;
pub mod telemetry;
mod types;

pub use error::InvalidArgumentError;
pub use pagination::Pagination;
pub use telemetry::{LogFormat, TelemetryConfig, init_tracing};
pub use types::AggregateId;
