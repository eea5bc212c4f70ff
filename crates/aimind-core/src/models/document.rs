use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted document: store-assigned identity plus the collection-specific body.
///
/// The body is flattened so serialized documents read as one flat object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredDocument<T> {
    pub id: Uuid,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> StoredDocument<T> {
    pub fn new(user_id: i64, body: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
            body,
        }
    }

    /// Keep identity and timestamps, swap the body.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StoredDocument<U> {
        StoredDocument {
            id: self.id,
            user_id: self.user_id,
            created_at: self.created_at,
            body: f(self.body),
        }
    }

    pub fn receipt(&self) -> DocumentReceipt {
        DocumentReceipt {
            id: self.id,
            user_id: self.user_id,
            created_at: self.created_at,
        }
    }
}

/// Identity of a freshly inserted document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentReceipt {
    pub id: Uuid,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Note {
        text: String,
    }

    #[test]
    fn test_body_is_flattened() {
        let doc = StoredDocument::new(7, Note { text: "hi".into() });
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["user_id"], json!(7));
        assert_eq!(value["text"], json!("hi"));
        assert!(value.get("body").is_none());

        let back: StoredDocument<Note> = serde_json::from_value(value).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_map_keeps_identity() {
        let doc = StoredDocument::new(3, 41);
        let id = doc.id;
        let mapped = doc.map(|n| n + 1);
        assert_eq!(mapped.id, id);
        assert_eq!(mapped.body, 42);
        assert_eq!(mapped.receipt().user_id, 3);
    }
}
