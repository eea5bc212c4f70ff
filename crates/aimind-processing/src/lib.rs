//! AiMind Processing Library
//!
//! Image validation, budget-driven normalization, data-URL decoding and the
//! upload pipeline that writes images to storage.

pub mod compression;
pub mod data_url;
pub mod normalizer;
pub mod upload;
pub mod validator;

pub use compression::ImageCompressor;
pub use data_url::{DataUrlError, DecodedDataUrl};
pub use normalizer::{ImageNormalizer, NormalizeError, NormalizedImage};
pub use upload::ImageUploader;
pub use validator::{UploadValidator, ValidationError};
