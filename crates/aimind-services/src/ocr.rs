//! Diary OCR client.

use std::time::Duration;

use aimind_core::models::JsonObject;
use aimind_core::AppError;
use async_trait::async_trait;
use serde_json::Value;

const OCR_TIMEOUT: Duration = Duration::from_secs(180);
const MAX_ERROR_BODY_CHARS: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR server unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("OCR server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("OCR response is not JSON: {0}")]
    InvalidJson(String),

    #[error("OCR response has unexpected shape: {0}")]
    UnexpectedShape(String),

    #[error("Failed to build OCR request: {0}")]
    Request(String),
}

impl From<OcrError> for AppError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::Request(msg) => AppError::Internal(msg),
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

#[async_trait]
pub trait OcrClient: Send + Sync {
    async fn extract(
        &self,
        data: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<JsonObject, OcrError>;
}

/// Posts the image as multipart field `file` to `{base_url}/diary-ocr`.
pub struct HttpOcrClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpOcrClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let http_client = reqwest::Client::builder()
            .timeout(OCR_TIMEOUT)
            .build()
            .context("Failed to create HTTP client for OCR service")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// A list yields its first element; the result must be an object.
fn unwrap_result(data: Value) -> Result<JsonObject, OcrError> {
    let raw = match data {
        Value::Array(items) if !items.is_empty() => items.into_iter().next().unwrap_or(Value::Null),
        other => other,
    };
    match raw {
        Value::Object(map) => Ok(map),
        other => Err(OcrError::UnexpectedShape(truncate_chars(
            &other.to_string(),
            MAX_ERROR_BODY_CHARS,
        ))),
    }
}

#[async_trait]
impl OcrClient for HttpOcrClient {
    async fn extract(
        &self,
        data: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<JsonObject, OcrError> {
        let url = format!("{}/diary-ocr", self.base_url);
        let size = data.len();

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| OcrError::Request(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let start = std::time::Instant::now();
        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url = %url, "OCR server unreachable");
                OcrError::Unreachable {
                    url: url.clone(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| OcrError::Unreachable {
            url: url.clone(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                body = %truncate_chars(&body, 500),
                "OCR server returned an error"
            );
            return Err(OcrError::Status {
                status: status.as_u16(),
                body: truncate_chars(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let data: Value = serde_json::from_str(&body)
            .map_err(|_| OcrError::InvalidJson(truncate_chars(&body, MAX_ERROR_BODY_CHARS)))?;

        tracing::info!(
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "OCR extraction completed"
        );

        unwrap_result(data)
    }
}
