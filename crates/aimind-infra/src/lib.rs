//! AiMind Infrastructure Library
//!
//! Shared infrastructure used by the binaries that host the AiMind services:
//! - Telemetry initialization (tracing subscriber)
//! - HTTP error response bodies built from [`aimind_core::AppError`]

pub mod error;
pub mod telemetry;

pub use error::ErrorResponse;
pub use telemetry::init_telemetry;
