//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use aimind_core::AppError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Unknown bucket: {0}")]
    UnknownBucket(String),

    #[error("Upload timed out after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConfigError(msg) => AppError::Config(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// The upload pipeline only ever writes objects, so the capability is a single
/// `put_object`. Backends do not retry; callers bound the call with a timeout.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `key` in `bucket` with the given content type.
    ///
    /// Objects are replaced atomically by the backend.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Keys must be relative and must not climb out of the bucket.
pub(crate) fn check_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|seg| seg == "..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aimind_core::ErrorMetadata;

    #[test]
    fn test_check_key() {
        assert!(check_key("users/1/profile/abc.jpg").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("/users/1").is_err());
        assert!(check_key("users/../secrets").is_err());
    }

    #[test]
    fn test_timeout_maps_to_storage_error() {
        let err: AppError = StorageError::Timeout(Duration::from_secs(30)).into();
        assert_eq!(err.http_status_code(), 502);
        assert!(err.to_string().contains("timed out"));
    }
}
