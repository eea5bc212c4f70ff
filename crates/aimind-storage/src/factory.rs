use crate::memory::InMemoryStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageResult};
use aimind_core::StorageConfig;
use std::sync::Arc;

#[cfg(not(feature = "storage-s3"))]
use crate::StorageError;

/// Create a storage backend based on configuration
pub fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    match config.backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let storage = S3Storage::new(config)?;
            tracing::info!(
                bucket = %config.bucket,
                region = %config.region,
                endpoint = ?config.endpoint,
                "Using S3 storage backend"
            );
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage backend; objects are lost on restart");
            Ok(Arc::new(InMemoryStorage::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_memory_backend() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            bucket: "b".to_string(),
            region: "us-east-1".to_string(),
            access_key_id: "k".to_string(),
            secret_access_key: "s".to_string(),
            public_base_url: None,
            endpoint: None,
            put_timeout: Duration::from_secs(30),
        };
        let storage = create_storage(&config).unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Memory);
    }
}
