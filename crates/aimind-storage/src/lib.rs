//! AiMind Storage Library
//!
//! This crate provides the object storage abstraction used by the upload pipeline:
//! the [`Storage`] trait with S3 and in-memory backends, object key construction
//! and public URL resolution.
//!
//! # Storage key format
//!
//! Keys are user-scoped: `users/{user_id}/{purpose}/{token}[_{tag}]{ext}` where the
//! purpose segment is `profile`, `analyses` or `diary-ocr`. Key generation is
//! centralized in the `keys` module so every caller produces the same layout.

pub mod factory;
pub mod keys;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;
pub mod url;

// Re-export commonly used types
pub use aimind_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{build_key, ObjectKey};
pub use memory::{InMemoryStorage, StoredObject};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use url::PublicUrlResolver;
