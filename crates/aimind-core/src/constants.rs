//! Application-wide constants.

/// Byte ceiling for any stored image (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Starting maximum pixel dimension for the normalizer.
pub const MAX_IMAGE_DIMENSION: u32 = 1024;

/// The normalizer never shrinks the longest side below this.
pub const MIN_IMAGE_DIMENSION: u32 = 320;

/// Geometric shrink applied to the max dimension between encode attempts.
pub const DIMENSION_SHRINK_FACTOR: f64 = 0.8;

/// Lossy encoder quality for JPEG and WebP output.
pub const LOSSY_QUALITY: u8 = 85;

/// libwebp effort level, 0 = fastest, 6 = smallest output.
pub const WEBP_METHOD: i32 = 6;

/// Root namespace of every user-owned object key.
pub const USER_NAMESPACE: &str = "users";

/// The provider's default region; public URLs omit the region segment there.
pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// Longest filename-derived extension (including the dot) accepted in object keys.
pub const MAX_FALLBACK_EXTENSION_LEN: usize = 10;

/// Public path served when a user has no profile image.
pub const DEFAULT_PROFILE_IMAGE_URL: &str = "/static/profile-default.svg";

/// Document collection names.
pub const DRAWING_ANALYSES_COLLECTION: &str = "drawing_analyses";
pub const DIARY_OCR_COLLECTION: &str = "diary_ocr";
pub const ANALYSIS_LOGS_COLLECTION: &str = "analysis_logs";
