//! Budget-driven image re-encoding.
//!
//! The normalizer decodes an upload with the codec implied by its declared
//! content type and re-encodes it at shrinking maximum dimensions until the
//! output fits the byte budget. Dimensions shrink geometrically from the
//! configured maximum (1024, 819, 655, 524, 419, 335 with the defaults) and
//! stop before crossing the 320px floor, so at most six encodes run.

use std::borrow::Cow;

use aimind_core::constants::{DIMENSION_SHRINK_FACTOR, MIN_IMAGE_DIMENSION};
use aimind_core::{AppError, ImageConfig, ImageContentType};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::compression::ImageCompressor;

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Failed to decode {content_type} image: {message}")]
    Decode {
        content_type: ImageContentType,
        message: String,
    },

    #[error("Encoded image is {size} bytes after {attempts} attempts (max: {max} bytes)")]
    TooLarge {
        size: usize,
        max: usize,
        attempts: u32,
    },

    #[error("Encoding failed: {0}")]
    Encode(String),
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::Decode { .. } => AppError::DecodeError(err.to_string()),
            NormalizeError::TooLarge { size, max, .. } => AppError::PayloadTooLarge { size, max },
            NormalizeError::Encode(msg) => AppError::Internal(msg),
        }
    }
}

/// A re-encoded image that fits the budget.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Number of encodes performed, starting at 1.
    pub iterations: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct ImageNormalizer {
    max_bytes: usize,
    max_dimension: u32,
}

impl ImageNormalizer {
    pub fn new(config: ImageConfig) -> Self {
        Self {
            max_bytes: config.max_bytes,
            max_dimension: config.max_dimension.max(MIN_IMAGE_DIMENSION),
        }
    }

    /// Whether `len` bytes already fit without re-encoding.
    pub fn fits(&self, len: usize) -> bool {
        len <= self.max_bytes
    }

    /// Decode and re-encode `data` until it fits the budget.
    ///
    /// CPU-bound; async callers should run it on the blocking pool.
    pub fn normalize(
        &self,
        data: &[u8],
        content_type: ImageContentType,
    ) -> Result<NormalizedImage, NormalizeError> {
        let mut img = decode(data, content_type)?;

        if content_type == ImageContentType::Jpeg && !matches!(img, DynamicImage::ImageRgb8(_)) {
            img = DynamicImage::ImageRgb8(img.to_rgb8());
        }

        let (orig_width, orig_height) = img.dimensions();
        let mut dimension = self.max_dimension;
        let mut attempts = 0u32;

        loop {
            let resized = downscale(&img, dimension);
            let (width, height) = resized.dimensions();
            let encoded = ImageCompressor::encode(&resized, content_type)
                .map_err(|e| NormalizeError::Encode(e.to_string()))?;
            attempts += 1;

            tracing::debug!(
                content_type = %content_type,
                attempt = attempts,
                max_dimension = dimension,
                width = width,
                height = height,
                size_bytes = encoded.len(),
                budget_bytes = self.max_bytes,
                "Normalization attempt"
            );

            if encoded.len() <= self.max_bytes {
                tracing::info!(
                    content_type = %content_type,
                    original_width = orig_width,
                    original_height = orig_height,
                    width = width,
                    height = height,
                    original_bytes = data.len(),
                    size_bytes = encoded.len(),
                    attempts = attempts,
                    "Image normalized"
                );
                return Ok(NormalizedImage {
                    data: encoded,
                    width,
                    height,
                    iterations: attempts,
                });
            }

            let next = next_dimension(dimension);
            if dimension <= MIN_IMAGE_DIMENSION || next < MIN_IMAGE_DIMENSION {
                return Err(NormalizeError::TooLarge {
                    size: encoded.len(),
                    max: self.max_bytes,
                    attempts,
                });
            }
            dimension = next;
        }
    }
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::new(ImageConfig::default())
    }
}

fn image_format(content_type: ImageContentType) -> ImageFormat {
    match content_type {
        ImageContentType::Jpeg => ImageFormat::Jpeg,
        ImageContentType::Png => ImageFormat::Png,
        ImageContentType::WebP => ImageFormat::WebP,
    }
}

fn decode(data: &[u8], content_type: ImageContentType) -> Result<DynamicImage, NormalizeError> {
    image::load_from_memory_with_format(data, image_format(content_type)).map_err(|e| {
        NormalizeError::Decode {
            content_type,
            message: e.to_string(),
        }
    })
}

fn next_dimension(dimension: u32) -> u32 {
    (dimension as f64 * DIMENSION_SHRINK_FACTOR) as u32
}

/// Fit within `dimension` x `dimension`, keeping aspect ratio. Never upscales.
fn downscale(img: &DynamicImage, dimension: u32) -> Cow<'_, DynamicImage> {
    let (width, height) = img.dimensions();
    if width <= dimension && height <= dimension {
        Cow::Borrowed(img)
    } else {
        Cow::Owned(img.resize(dimension, dimension, FilterType::Lanczos3))
    }
}
