use std::sync::Arc;
use std::time::{Duration, Instant};

use aimind_core::{
    AnalysisSubject, AppError, AttachFailure, AttachOutcome, Config, ImageAsset, ImageConfig,
    ImageContentType, ImagePurpose,
};
use aimind_storage::{build_key, ObjectKey, PublicUrlResolver, Storage, StorageError};
use tokio::sync::Semaphore;

use crate::data_url;
use crate::normalizer::ImageNormalizer;
use crate::validator::UploadValidator;

/// Stores user images: validates, re-encodes over-budget payloads, writes
/// them under a fresh key and returns the public URL.
///
/// Normalization is CPU-bound and runs on the blocking pool, at most one job
/// per available core.
pub struct ImageUploader {
    storage: Arc<dyn Storage>,
    urls: PublicUrlResolver,
    bucket: String,
    validator: UploadValidator,
    normalizer: ImageNormalizer,
    put_timeout: Duration,
    normalize_permits: Arc<Semaphore>,
}

impl ImageUploader {
    pub fn new(storage: Arc<dyn Storage>, config: &Config) -> Self {
        Self::with_settings(
            storage,
            PublicUrlResolver::from_config(&config.storage),
            config.storage.bucket.clone(),
            config.image,
            config.storage.put_timeout,
        )
    }

    pub fn with_settings(
        storage: Arc<dyn Storage>,
        urls: PublicUrlResolver,
        bucket: impl Into<String>,
        image: ImageConfig,
        put_timeout: Duration,
    ) -> Self {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            storage,
            urls,
            bucket: bucket.into(),
            validator: UploadValidator::new(),
            normalizer: ImageNormalizer::new(image),
            put_timeout,
            normalize_permits: Arc::new(Semaphore::new(cores)),
        }
    }

    /// Store a profile image and return its public URL.
    ///
    /// A missing content type is treated as unsupported. Storage failures are
    /// returned to the caller.
    pub async fn upload_profile_image(
        &self,
        user_id: i64,
        data: Vec<u8>,
        content_type: Option<&str>,
        filename: Option<&str>,
    ) -> Result<String, AppError> {
        let asset = ImageAsset {
            user_id,
            purpose: ImagePurpose::Profile,
            content_type: content_type.unwrap_or_default().to_string(),
            filename: filename.map(str::to_string),
            data,
        };
        let (_, url) = self.store(asset).await?;
        Ok(url)
    }

    /// Store a diary page image and return its public URL.
    ///
    /// A missing content type defaults to JPEG.
    pub async fn upload_diary_image(
        &self,
        user_id: i64,
        data: Vec<u8>,
        content_type: Option<&str>,
        filename: Option<&str>,
    ) -> Result<String, AppError> {
        let asset = ImageAsset {
            user_id,
            purpose: ImagePurpose::DiaryOcr,
            content_type: content_type
                .filter(|ct| !ct.trim().is_empty())
                .unwrap_or(ImageContentType::Jpeg.mime())
                .to_string(),
            filename: filename.map(str::to_string),
            data,
        };
        let (_, url) = self.store(asset).await?;
        Ok(url)
    }

    /// Best-effort store of an analysis box image given as a data URL.
    ///
    /// Never fails; problems are reported as [`AttachOutcome::Failed`].
    pub async fn attach_analysis_image(
        &self,
        user_id: i64,
        subject: AnalysisSubject,
        data_url: Option<&str>,
    ) -> AttachOutcome {
        let data_url = match data_url.map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => return AttachOutcome::Skipped,
        };

        let failed = |reason: String| {
            tracing::warn!(
                user_id = user_id,
                subject = %subject,
                reason = %reason,
                "Analysis image not attached"
            );
            AttachOutcome::Failed(AttachFailure { subject, reason })
        };

        let decoded = match data_url::decode(data_url) {
            Ok(decoded) => decoded,
            Err(e) => return failed(AppError::from(e).to_string()),
        };

        let content_type = ImageContentType::from_mime(&decoded.content_type)
            .unwrap_or(ImageContentType::Jpeg)
            .mime()
            .to_string();

        let asset = ImageAsset {
            user_id,
            purpose: ImagePurpose::AnalysisBox(subject),
            content_type,
            filename: None,
            data: decoded.data,
        };

        match self.store(asset).await {
            Ok((key, url)) => AttachOutcome::Attached {
                key: key.into_string(),
                url,
            },
            Err(e) => failed(e.to_string()),
        }
    }

    /// validate → normalize (only when over budget) → key → put → URL
    async fn store(&self, asset: ImageAsset) -> Result<(ObjectKey, String), AppError> {
        let content_type = self
            .validator
            .validate(&asset.content_type, asset.data.len())?;

        let data = if self.normalizer.fits(asset.data.len()) {
            asset.data
        } else {
            self.normalize(asset.data, content_type).await?
        };

        let key = build_key(
            asset.user_id,
            asset.purpose,
            &asset.content_type,
            asset.filename.as_deref(),
        );
        self.put(&key, data, content_type).await?;

        let url = self.urls.resolve(key.as_str());
        tracing::info!(
            user_id = asset.user_id,
            purpose = asset.purpose.as_str(),
            key = %key,
            "Image stored"
        );
        Ok((key, url))
    }

    async fn normalize(
        &self,
        data: Vec<u8>,
        content_type: ImageContentType,
    ) -> Result<Vec<u8>, AppError> {
        let _permit = self
            .normalize_permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::Internal(format!("Normalization semaphore closed: {}", e)))?;

        let normalizer = self.normalizer;
        let normalized =
            tokio::task::spawn_blocking(move || normalizer.normalize(&data, content_type))
                .await
                .map_err(|e| AppError::Internal(format!("Normalization task failed: {}", e)))??;

        Ok(normalized.data)
    }

    async fn put(
        &self,
        key: &ObjectKey,
        data: Vec<u8>,
        content_type: ImageContentType,
    ) -> Result<(), StorageError> {
        let start = Instant::now();
        let size = data.len();
        let result = tokio::time::timeout(
            self.put_timeout,
            self.storage
                .put_object(&self.bucket, key.as_str(), data, content_type.mime()),
        )
        .await
        .unwrap_or(Err(StorageError::Timeout(self.put_timeout)));

        if let Err(ref e) = result {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Image upload failed"
            );
        }
        result
    }
}
