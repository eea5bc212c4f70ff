//! AiMind Core Library
//!
//! This crate provides the domain models, error types, configuration and constants
//! shared by the storage, processing and service crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, ImageConfig, ServicesConfig, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AnalysisSubject, AttachFailure, AttachOutcome, ImageAsset, ImageContentType, ImagePurpose,
    SaveOutcome,
};
pub use storage_types::StorageBackend;
