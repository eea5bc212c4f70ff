//! Document persistence for analysis and diary records.
//!
//! The store works on JSON bodies so the trait stays object-safe; [`Collection`]
//! adds typed access for one named collection.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use aimind_core::models::StoredDocument;
use aimind_core::AppError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreError {
    #[error("Document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document store backend error: {0}")]
    Backend(String),
}

pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<DocumentStoreError> for AppError {
    fn from(err: DocumentStoreError) -> Self {
        AppError::DocumentStore(err.to_string())
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a body and return it with its assigned id and timestamp.
    async fn insert(
        &self,
        collection: &str,
        user_id: i64,
        body: Value,
    ) -> DocumentStoreResult<StoredDocument<Value>>;

    async fn get(
        &self,
        collection: &str,
        id: Uuid,
    ) -> DocumentStoreResult<Option<StoredDocument<Value>>>;

    /// All documents of a user, newest first.
    async fn find_by_user(
        &self,
        collection: &str,
        user_id: i64,
    ) -> DocumentStoreResult<Vec<StoredDocument<Value>>>;
}

/// Typed view over one collection.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    name: &'static str,
    _body: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            name: self.name,
            _body: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn DocumentStore>, name: &'static str) -> Self {
        Self {
            store,
            name,
            _body: PhantomData,
        }
    }

    pub async fn insert(&self, user_id: i64, body: T) -> DocumentStoreResult<StoredDocument<T>> {
        let value = serde_json::to_value(&body)?;
        let stored = self.store.insert(self.name, user_id, value).await?;
        Ok(stored.map(|_| body))
    }

    pub async fn get(&self, id: Uuid) -> DocumentStoreResult<Option<StoredDocument<T>>> {
        match self.store.get(self.name, id).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_user(&self, user_id: i64) -> DocumentStoreResult<Vec<StoredDocument<T>>> {
        self.store
            .find_by_user(self.name, user_id)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }
}

fn decode<T: DeserializeOwned>(doc: StoredDocument<Value>) -> DocumentStoreResult<StoredDocument<T>> {
    let StoredDocument {
        id,
        user_id,
        created_at,
        body,
    } = doc;
    Ok(StoredDocument {
        id,
        user_id,
        created_at,
        body: serde_json::from_value(body)?,
    })
}

/// Mutex-guarded in-process document store.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<Mutex<HashMap<String, Vec<StoredDocument<Value>>>>>,
    fail: Arc<AtomicBool>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> DocumentStoreResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::Backend(
                "in-memory store set to fail".to_string(),
            ));
        }
        Ok(())
    }

    fn lock(
        &self,
    ) -> DocumentStoreResult<std::sync::MutexGuard<'_, HashMap<String, Vec<StoredDocument<Value>>>>>
    {
        self.collections
            .lock()
            .map_err(|_| DocumentStoreError::Backend("document store lock poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(
        &self,
        collection: &str,
        user_id: i64,
        body: Value,
    ) -> DocumentStoreResult<StoredDocument<Value>> {
        self.check()?;
        let doc = StoredDocument::new(user_id, body);
        self.lock()?
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        tracing::debug!(collection = %collection, id = %doc.id, user_id = user_id, "Document inserted");
        Ok(doc)
    }

    async fn get(
        &self,
        collection: &str,
        id: Uuid,
    ) -> DocumentStoreResult<Option<StoredDocument<Value>>> {
        self.check()?;
        Ok(self
            .lock()?
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id).cloned()))
    }

    async fn find_by_user(
        &self,
        collection: &str,
        user_id: i64,
    ) -> DocumentStoreResult<Vec<StoredDocument<Value>>> {
        self.check()?;
        let mut docs: Vec<_> = self
            .lock()?
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .rev()
                    .filter(|doc| doc.user_id == user_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // Reverse insertion order breaks timestamp ties newest first.
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }
}
