//! In-memory storage backend for tests and local development.

use crate::traits::{check_key, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An object captured by [`InMemoryStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Records every put in a map keyed by `(bucket, key)`.
///
/// Can be switched into a failing mode, or told to stall, to exercise error
/// and timeout paths.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    objects: Arc<Mutex<HashMap<(String, String), StoredObject>>>,
    fail: Arc<AtomicBool>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose puts always fail.
    pub fn failing() -> Self {
        let storage = Self::default();
        storage.set_fail(true);
        storage
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Sleep this long inside every put.
    pub fn set_delay(&self, delay: Option<Duration>) {
        if let Ok(mut guard) = self.delay.lock() {
            *guard = delay;
        }
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .ok()?
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .map(|objects| objects.keys().map(|(_, key)| key.clone()).collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()> {
        check_key(key)?;

        let delay = self.delay.lock().ok().and_then(|guard| *guard);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            tracing::error!(bucket = %bucket, key = %key, "In-memory upload failed");
            return Err(StorageError::UploadFailed(
                "in-memory backend set to fail".to_string(),
            ));
        }

        let size = data.len();
        self.objects
            .lock()
            .map_err(|_| StorageError::UploadFailed("storage lock poisoned".to_string()))?
            .insert(
                (bucket.to_string(), key.to_string()),
                StoredObject {
                    data,
                    content_type: content_type.to_string(),
                },
            );

        tracing::debug!(bucket = %bucket, key = %key, size_bytes = size, "In-memory upload stored");
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_records_object() {
        let storage = InMemoryStorage::new();
        storage
            .put_object("b", "users/1/profile/a.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        let obj = storage.get("b", "users/1/profile/a.png").unwrap();
        assert_eq!(obj.data, vec![1, 2, 3]);
        assert_eq!(obj.content_type, "image/png");
        assert_eq!(storage.keys(), vec!["users/1/profile/a.png".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_mode() {
        let storage = InMemoryStorage::failing();
        let err = storage
            .put_object("b", "users/1/profile/a.png", vec![1], "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed(_)));
        assert!(storage.is_empty());

        storage.set_fail(false);
        storage
            .put_object("b", "users/1/profile/a.png", vec![1], "image/png")
            .await
            .unwrap();
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_objects() {
        let storage = InMemoryStorage::new();
        let handle = storage.clone();
        storage
            .put_object("b", "users/9/diary-ocr/x.jpg", vec![0], "image/jpeg")
            .await
            .unwrap();
        assert!(handle.get("b", "users/9/diary-ocr/x.jpg").is_some());
    }
}
