//! Legacy analysis log append/list.

use aimind_core::models::{AnalysisLog, AnalysisLogBody, AnalysisSaveRequest, DocumentReceipt};
use aimind_core::AppError;

use crate::document_store::Collection;

pub struct AnalysisLogService {
    logs: Collection<AnalysisLogBody>,
}

impl AnalysisLogService {
    pub fn new(logs: Collection<AnalysisLogBody>) -> Self {
        Self { logs }
    }

    pub async fn save(&self, request: AnalysisSaveRequest) -> Result<DocumentReceipt, AppError> {
        let (user_id, body) = request.into_body();
        let doc = self.logs.insert(user_id, body).await?;
        Ok(doc.receipt())
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<AnalysisLog>, AppError> {
        Ok(self.logs.find_by_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::InMemoryDocumentStore;
    use aimind_core::constants::ANALYSIS_LOGS_COLLECTION;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_save_and_list() {
        let service = AnalysisLogService::new(Collection::new(
            Arc::new(InMemoryDocumentStore::new()),
            ANALYSIS_LOGS_COLLECTION,
        ));

        let first: AnalysisSaveRequest =
            serde_json::from_value(json!({"user_id": 2, "image_to_json": {"tree": {}}})).unwrap();
        let second: AnalysisSaveRequest = serde_json::from_value(json!({
            "user_id": 2,
            "llm_result_text": {"summary": "calm"}
        }))
        .unwrap();

        let a = service.save(first).await.unwrap();
        let b = service.save(second).await.unwrap();
        assert_eq!(a.user_id, 2);
        assert_ne!(a.id, b.id);

        let logs = service.list(2).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].id, b.id);
        assert_eq!(
            logs[0].body.llm_result_text.as_ref().unwrap()["summary"],
            json!("calm")
        );
        assert!(service.list(3).await.unwrap().is_empty());
    }
}
