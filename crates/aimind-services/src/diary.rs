//! Picture diary OCR extraction and entry persistence.

use std::sync::Arc;

use aimind_core::models::{DiaryEntryForm, DiaryOcrEntry, DiaryOcrEntryBody, JsonObject};
use aimind_core::{AppError, ImageContentType};
use aimind_processing::{data_url, ImageUploader};
use serde_json::Value;

use crate::document_store::Collection;
use crate::ocr::OcrClient;

/// An uploaded diary image as received from a multipart form.
#[derive(Debug, Clone, Default)]
pub struct DiaryUpload {
    pub data: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl DiaryUpload {
    fn filename(&self) -> Option<&str> {
        self.filename.as_deref().filter(|name| !name.is_empty())
    }

    fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(ImageContentType::Jpeg.mime())
    }
}

pub struct DiaryService {
    uploader: Arc<ImageUploader>,
    entries: Collection<DiaryOcrEntryBody>,
    ocr: Arc<dyn OcrClient>,
}

impl DiaryService {
    pub fn new(
        uploader: Arc<ImageUploader>,
        entries: Collection<DiaryOcrEntryBody>,
        ocr: Arc<dyn OcrClient>,
    ) -> Self {
        Self {
            uploader,
            entries,
            ocr,
        }
    }

    /// Run OCR on a diary page without storing anything.
    ///
    /// The result always carries an `image_data_url`: the cropped image from
    /// the OCR service when present, otherwise the uploaded bytes.
    pub async fn extract(&self, upload: DiaryUpload) -> Result<JsonObject, AppError> {
        let filename = upload
            .filename()
            .ok_or_else(|| AppError::BadRequest("An image file is required".to_string()))?
            .to_string();
        let content_type = upload.content_type().to_string();

        let mut result = self
            .ocr
            .extract(upload.data.clone(), &filename, &content_type)
            .await?;

        let has_image = result
            .get("image_data_url")
            .and_then(Value::as_str)
            .is_some_and(|url| !url.is_empty());
        if !has_image {
            result.insert(
                "image_data_url".to_string(),
                Value::String(data_url::encode(&upload.data, Some(&content_type))),
            );
        }

        Ok(result)
    }

    /// Upload the diary image then store the entry.
    pub async fn save(
        &self,
        user_id: i64,
        upload: DiaryUpload,
        form: DiaryEntryForm,
    ) -> Result<DiaryOcrEntry, AppError> {
        let filename = upload
            .filename()
            .ok_or_else(|| AppError::BadRequest("An image file is required".to_string()))?
            .to_string();
        if upload.data.is_empty() {
            return Err(AppError::EmptyPayload);
        }
        let content_type = upload.content_type().to_string();

        let image_url = self
            .uploader
            .upload_diary_image(user_id, upload.data, Some(&content_type), Some(&filename))
            .await?;

        let doc = self
            .entries
            .insert(user_id, form.into_body(image_url))
            .await?;
        tracing::info!(id = %doc.id, user_id = user_id, "Diary entry saved");
        Ok(doc)
    }

    /// Entries of `user_id`, newest first.
    pub async fn list(&self, user_id: i64) -> Result<Vec<DiaryOcrEntry>, AppError> {
        Ok(self.entries.find_by_user(user_id).await?)
    }
}
