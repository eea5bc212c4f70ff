//! Configuration module
//!
//! Configuration is resolved once at process start from the environment (a `.env`
//! file is loaded first when present) and is read-only afterwards.

use std::env;
use std::time::Duration;

use anyhow::Context;

use crate::constants::{MAX_IMAGE_BYTES, MAX_IMAGE_DIMENSION, MIN_IMAGE_DIMENSION};
use crate::storage_types::StorageBackend;

const STORAGE_PUT_TIMEOUT_SECS: u64 = 30;
const AIMODELS_BASE_URL: &str = "http://localhost:8080";
const OCR_BASE_URL: &str = "http://127.0.0.1:8090";

/// Object storage settings.
#[derive(Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// CDN or custom public base URL for objects
    pub public_base_url: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO etc.)
    pub endpoint: Option<String>,
    pub put_timeout: Duration,
}

// Credentials stay out of logs.
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("public_base_url", &self.public_base_url)
            .field("endpoint", &self.endpoint)
            .field("put_timeout", &self.put_timeout)
            .finish_non_exhaustive()
    }
}

/// Image budget settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageConfig {
    pub max_bytes: usize,
    pub max_dimension: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_bytes: MAX_IMAGE_BYTES,
            max_dimension: MAX_IMAGE_DIMENSION,
        }
    }
}

/// Upstream AI/OCR collaborators.
#[derive(Clone, Debug)]
pub struct ServicesConfig {
    pub aimodels_base_url: String,
    pub ocr_base_url: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            aimodels_base_url: AIMODELS_BASE_URL.to_string(),
            ocr_base_url: OCR_BASE_URL.to_string(),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub log_json: bool,
    pub storage: StorageConfig,
    pub image: ImageConfig,
    pub services: ServicesConfig,
}

fn required(key: &str) -> Result<String, anyhow::Error> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} must be set", key))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let backend: StorageBackend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "s3".to_string())
            .parse()
            .context("STORAGE_BACKEND must be 's3' or 'memory'")?;

        let storage = StorageConfig {
            backend,
            bucket: required("S3_BUCKET")?,
            region: required("S3_REGION")?,
            access_key_id: required("S3_ACCESS_KEY_ID")?,
            secret_access_key: required("S3_SECRET_ACCESS_KEY")?,
            public_base_url: optional("S3_PUBLIC_BASE_URL"),
            endpoint: optional("S3_ENDPOINT"),
            put_timeout: Duration::from_secs(
                env::var("STORAGE_PUT_TIMEOUT_SECS")
                    .unwrap_or_else(|_| STORAGE_PUT_TIMEOUT_SECS.to_string())
                    .parse()
                    .unwrap_or(STORAGE_PUT_TIMEOUT_SECS),
            ),
        };

        let image = ImageConfig {
            max_bytes: env::var("MAX_IMAGE_BYTES")
                .unwrap_or_else(|_| MAX_IMAGE_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_IMAGE_BYTES),
            max_dimension: env::var("MAX_IMAGE_DIMENSION")
                .unwrap_or_else(|_| MAX_IMAGE_DIMENSION.to_string())
                .parse()
                .unwrap_or(MAX_IMAGE_DIMENSION),
        };

        let services = ServicesConfig {
            aimodels_base_url: env::var("AIMODELS_BASE_URL")
                .unwrap_or_else(|_| AIMODELS_BASE_URL.to_string()),
            ocr_base_url: env::var("OCR_BASE_URL").unwrap_or_else(|_| OCR_BASE_URL.to_string()),
        };

        let config = Config {
            environment,
            log_json: env::var("LOG_JSON")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            storage,
            image,
            services,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.image.max_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_BYTES must be greater than zero"));
        }

        if self.image.max_dimension < MIN_IMAGE_DIMENSION {
            return Err(anyhow::anyhow!(
                "MAX_IMAGE_DIMENSION must be at least {}",
                MIN_IMAGE_DIMENSION
            ));
        }

        if self.storage.put_timeout.is_zero() {
            return Err(anyhow::anyhow!(
                "STORAGE_PUT_TIMEOUT_SECS must be greater than zero"
            ));
        }

        if let Some(base) = &self.storage.public_base_url {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(anyhow::anyhow!(
                    "S3_PUBLIC_BASE_URL must be an http(s) URL"
                ));
            }
        }

        if self.is_production() && self.storage.backend == StorageBackend::Memory {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=memory is not allowed in production"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            environment: "development".to_string(),
            log_json: false,
            storage: StorageConfig {
                backend: StorageBackend::S3,
                bucket: "aimind-media".to_string(),
                region: "ap-northeast-2".to_string(),
                access_key_id: "AKIA".to_string(),
                secret_access_key: "secret".to_string(),
                public_base_url: None,
                endpoint: None,
                put_timeout: Duration::from_secs(30),
            },
            image: ImageConfig::default(),
            services: ServicesConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_memory_backend_rejected_in_production() {
        let mut config = sample();
        config.environment = "production".to_string();
        config.storage.backend = StorageBackend::Memory;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dimension_below_floor_rejected() {
        let mut config = sample();
        config.image.max_dimension = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_public_base_url_must_be_http() {
        let mut config = sample();
        config.storage.public_base_url = Some("cdn.example.com".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_hides_credentials() {
        let rendered = format!("{:?}", sample().storage);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("aimind-media"));
    }
}
