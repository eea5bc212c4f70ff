use aimind_core::{AppError, ImageContentType};

/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<&'static str>,
    },

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidContentType { content_type, .. } => {
                AppError::UnsupportedMediaType(content_type)
            }
            ValidationError::EmptyFile => AppError::EmptyPayload,
        }
    }
}

/// Image upload validator
///
/// Checks the declared content type against the allowed table, then the
/// payload length. No side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadValidator;

impl UploadValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate content type then size; returns the recognised type.
    pub fn validate(
        &self,
        content_type: &str,
        byte_len: usize,
    ) -> Result<ImageContentType, ValidationError> {
        let ct = self.validate_content_type(content_type)?;
        if byte_len == 0 {
            return Err(ValidationError::EmptyFile);
        }
        Ok(ct)
    }

    pub fn validate_content_type(
        &self,
        content_type: &str,
    ) -> Result<ImageContentType, ValidationError> {
        ImageContentType::from_mime(content_type).ok_or_else(|| {
            ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: ImageContentType::ALL.iter().map(|ct| ct.mime()).collect(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_allowed_types() {
        let v = UploadValidator::new();
        assert_eq!(v.validate("image/jpeg", 10).unwrap(), ImageContentType::Jpeg);
        assert_eq!(v.validate("image/png", 1).unwrap(), ImageContentType::Png);
        assert_eq!(v.validate("image/webp", 1).unwrap(), ImageContentType::WebP);
    }

    #[test]
    fn test_gif_is_unsupported() {
        let err = UploadValidator::new().validate("image/gif", 100).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidContentType { .. }));
        let app: AppError = err.into();
        assert!(matches!(app, AppError::UnsupportedMediaType(ct) if ct == "image/gif"));
    }

    #[test]
    fn test_type_checked_before_size() {
        let err = UploadValidator::new().validate("text/plain", 0).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidContentType { .. }));
    }

    #[test]
    fn test_empty_payload() {
        let err = UploadValidator::new().validate("image/png", 0).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyFile));
        assert!(matches!(AppError::from(err), AppError::EmptyPayload));
    }
}
