//! Data models for the application
//!
//! Organized by domain: uploaded images, persisted analysis/diary documents, and the
//! explicit outcome types returned by best-effort flows.

mod analysis;
mod diary;
mod document;
mod image;
mod outcome;

// Re-export all models for convenient imports
pub use analysis::*;
pub use diary::*;
pub use document::*;
pub use image::*;
pub use outcome::*;
