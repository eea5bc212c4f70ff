//! Base64 image data URLs (`data:image/<subtype>;base64,<payload>`).

use aimind_core::{AppError, ImageContentType};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;

const DATA_URL_PATTERN: &str = r"(?s)^data:image/(\w+);base64,(.+)";
const KNOWN_SUBTYPES: [&str; 5] = ["jpeg", "jpg", "png", "webp", "gif"];

#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    #[error("not a base64 image data URL")]
    Pattern,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload decodes to zero bytes")]
    Empty,

    #[error("pattern compile error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<DataUrlError> for AppError {
    fn from(err: DataUrlError) -> Self {
        AppError::MalformedDataUrl(err.to_string())
    }
}

/// Decoded payload plus the content type named by the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUrl {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Decode a data URL into bytes and an `image/*` content type.
///
/// Unknown subtypes are reported as `image/jpeg`; `gif` passes through and is
/// left for callers to coerce or reject.
pub fn decode(data_url: &str) -> Result<DecodedDataUrl, DataUrlError> {
    let pattern = Regex::new(DATA_URL_PATTERN)?;
    let caps = pattern.captures(data_url).ok_or(DataUrlError::Pattern)?;

    let subtype = caps[1].to_lowercase();
    let content_type = if KNOWN_SUBTYPES.contains(&subtype.as_str()) {
        format!("image/{}", subtype)
    } else {
        ImageContentType::Jpeg.mime().to_string()
    };

    // Line-wrapped payloads are accepted; whitespace is not part of the alphabet.
    let payload: String = caps[2]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let data = STANDARD.decode(payload)?;
    if data.is_empty() {
        return Err(DataUrlError::Empty);
    }

    Ok(DecodedDataUrl { data, content_type })
}

/// Build a data URL, stripping MIME parameters; defaults to `image/jpeg`.
pub fn encode(data: &[u8], content_type: Option<&str>) -> String {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .unwrap_or(ImageContentType::Jpeg.mime());
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}
