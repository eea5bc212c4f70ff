//! Drawing analysis persistence.
//!
//! Box images are attached best-effort: a failed upload is reported in the
//! returned [`SaveOutcome`] and the analysis is stored without that URL.

use std::collections::BTreeMap;
use std::sync::Arc;

use aimind_core::models::{
    DrawingAnalysis, DrawingAnalysisBody, DrawingAnalysisSaveRequest, DrawingAnalysisSummary,
};
use aimind_core::{AnalysisSubject, AppError, AttachOutcome, SaveOutcome};
use aimind_processing::ImageUploader;
use serde_json::Value;
use uuid::Uuid;

use crate::document_store::Collection;
use crate::score::ScoreClient;

pub struct DrawingAnalysisService {
    uploader: Arc<ImageUploader>,
    analyses: Collection<DrawingAnalysisBody>,
    scores: Arc<dyn ScoreClient>,
}

impl DrawingAnalysisService {
    pub fn new(
        uploader: Arc<ImageUploader>,
        analyses: Collection<DrawingAnalysisBody>,
        scores: Arc<dyn ScoreClient>,
    ) -> Self {
        Self {
            uploader,
            analyses,
            scores,
        }
    }

    pub async fn save(
        &self,
        request: DrawingAnalysisSaveRequest,
    ) -> Result<SaveOutcome<DrawingAnalysisSummary>, AppError> {
        let user_id = request.user_id;
        let mut analyzed_image_urls = BTreeMap::new();
        let mut failures = Vec::new();

        for subject in AnalysisSubject::ALL {
            let data_url = request
                .box_images_base64
                .get(subject.as_str())
                .and_then(|v| v.as_deref());

            match self
                .uploader
                .attach_analysis_image(user_id, subject, data_url)
                .await
            {
                AttachOutcome::Attached { url, .. } => {
                    analyzed_image_urls.insert(subject.as_str().to_string(), url);
                }
                AttachOutcome::Skipped => {}
                AttachOutcome::Failed(failure) => failures.push(failure),
            }
        }

        let body = DrawingAnalysisBody {
            child_info: request.child_info,
            element_analysis: request.element_analysis,
            analyzed_image_urls,
            psychological_interpretation: request.psychological_interpretation,
            comparison: request.comparison,
            recommendations: request.recommendations,
            overall_psychology_result: request.overall_psychology_result,
        };

        let doc = self.analyses.insert(user_id, body).await?;
        let summary = DrawingAnalysisSummary::from(&doc);

        if failures.is_empty() {
            tracing::info!(id = %doc.id, user_id = user_id, "Drawing analysis saved");
        } else {
            tracing::warn!(
                id = %doc.id,
                user_id = user_id,
                failed_subjects = ?failures.iter().map(|f| f.subject.as_str()).collect::<Vec<_>>(),
                "Drawing analysis saved without some box images"
            );
        }

        Ok(SaveOutcome::from_parts(summary, failures))
    }

    /// Analyses of `user_id`, newest first. Only the owner may list them.
    pub async fn list(
        &self,
        requester_id: i64,
        user_id: i64,
    ) -> Result<Vec<DrawingAnalysis>, AppError> {
        if requester_id != user_id {
            return Err(AppError::Forbidden(
                "Cannot list another user's analyses".to_string(),
            ));
        }
        Ok(self.analyses.find_by_user(user_id).await?)
    }

    /// Fetch one analysis with freshly computed drawing scores.
    pub async fn get(&self, requester_id: i64, id: &str) -> Result<DrawingAnalysis, AppError> {
        let not_found = || AppError::NotFound(format!("Drawing analysis {} not found", id));
        let id = Uuid::parse_str(id).map_err(|_| not_found())?;

        let mut doc = self.analyses.get(id).await?.ok_or_else(not_found)?;
        if doc.user_id != requester_id {
            return Err(AppError::Forbidden(
                "Cannot read another user's analysis".to_string(),
            ));
        }

        if let Some(scores) = self
            .scores
            .analyze_score(&doc.body.element_analysis, &doc.body.child_info)
            .await
            .filter(is_truthy)
        {
            doc.body
                .comparison
                .insert("drawing_scores".to_string(), scores);
        }

        Ok(doc)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Object(o) => !o.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
