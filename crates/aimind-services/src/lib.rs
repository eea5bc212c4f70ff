//! AiMind Services Layer
//!
//! Business services that sit on top of the upload pipeline: drawing analysis
//! persistence with score recomputation, diary OCR entries and the legacy
//! analysis log. External collaborators (document store, score and OCR
//! services) are traits injected as `Arc<dyn _>`.

pub mod analysis_log;
pub mod diary;
pub mod document_store;
pub mod drawing_analysis;
pub mod ocr;
pub mod score;

use std::sync::Arc;

use aimind_core::constants::{
    ANALYSIS_LOGS_COLLECTION, DIARY_OCR_COLLECTION, DRAWING_ANALYSES_COLLECTION,
};
use aimind_core::Config;
use aimind_processing::ImageUploader;
use aimind_storage::Storage;

pub use analysis_log::AnalysisLogService;
pub use diary::{DiaryService, DiaryUpload};
pub use document_store::{
    Collection, DocumentStore, DocumentStoreError, DocumentStoreResult, InMemoryDocumentStore,
};
pub use drawing_analysis::DrawingAnalysisService;
pub use ocr::{HttpOcrClient, OcrClient, OcrError};
pub use score::{build_score_request, HttpScoreClient, ScoreClient, ScoreRequest};

/// Every service wired to one storage backend and one document store.
pub struct AppServices {
    pub uploader: Arc<ImageUploader>,
    pub drawing_analyses: DrawingAnalysisService,
    pub diaries: DiaryService,
    pub analysis_logs: AnalysisLogService,
}

impl AppServices {
    /// Build services with HTTP score and OCR clients from `config`.
    pub fn new(
        config: &Config,
        storage: Arc<dyn Storage>,
        documents: Arc<dyn DocumentStore>,
    ) -> anyhow::Result<Self> {
        let scores = Arc::new(HttpScoreClient::new(
            config.services.aimodels_base_url.clone(),
        )?);
        let ocr = Arc::new(HttpOcrClient::new(config.services.ocr_base_url.clone())?);
        Ok(Self::with_clients(config, storage, documents, scores, ocr))
    }

    pub fn with_clients(
        config: &Config,
        storage: Arc<dyn Storage>,
        documents: Arc<dyn DocumentStore>,
        scores: Arc<dyn ScoreClient>,
        ocr: Arc<dyn OcrClient>,
    ) -> Self {
        let uploader = Arc::new(ImageUploader::new(storage, config));

        tracing::info!(
            bucket = %config.storage.bucket,
            aimodels_base_url = %config.services.aimodels_base_url,
            ocr_base_url = %config.services.ocr_base_url,
            "Services initialized"
        );

        Self {
            drawing_analyses: DrawingAnalysisService::new(
                uploader.clone(),
                Collection::new(documents.clone(), DRAWING_ANALYSES_COLLECTION),
                scores,
            ),
            diaries: DiaryService::new(
                uploader.clone(),
                Collection::new(documents.clone(), DIARY_OCR_COLLECTION),
                ocr,
            ),
            analysis_logs: AnalysisLogService::new(Collection::new(
                documents,
                ANALYSIS_LOGS_COLLECTION,
            )),
            uploader,
        }
    }
}
