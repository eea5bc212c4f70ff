use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::constants::DEFAULT_PROFILE_IMAGE_URL;

/// Image content types accepted for storage, with their canonical file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageContentType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    WebP,
}

impl ImageContentType {
    pub const ALL: [ImageContentType; 3] = [
        ImageContentType::Jpeg,
        ImageContentType::Png,
        ImageContentType::WebP,
    ];

    /// Look up a MIME type in the allowed table.
    ///
    /// Parameters (`; charset=...`) and ASCII case are ignored.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        Self::ALL.into_iter().find(|ct| ct.mime() == essence)
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageContentType::Jpeg => "image/jpeg",
            ImageContentType::Png => "image/png",
            ImageContentType::WebP => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageContentType::Jpeg => ".jpg",
            ImageContentType::Png => ".png",
            ImageContentType::WebP => ".webp",
        }
    }
}

impl Display for ImageContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.mime())
    }
}

/// One of the four drawing elements the analysis models score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSubject {
    Tree,
    House,
    Man,
    Woman,
}

impl AnalysisSubject {
    pub const ALL: [AnalysisSubject; 4] = [
        AnalysisSubject::Tree,
        AnalysisSubject::House,
        AnalysisSubject::Man,
        AnalysisSubject::Woman,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisSubject::Tree => "tree",
            AnalysisSubject::House => "house",
            AnalysisSubject::Man => "man",
            AnalysisSubject::Woman => "woman",
        }
    }
}

impl FromStr for AnalysisSubject {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tree" => Ok(AnalysisSubject::Tree),
            "house" => Ok(AnalysisSubject::House),
            "man" => Ok(AnalysisSubject::Man),
            "woman" => Ok(AnalysisSubject::Woman),
            _ => Err(anyhow::anyhow!("Invalid analysis subject: {}", s)),
        }
    }
}

impl Display for AnalysisSubject {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Logical category of an uploaded image; controls its object key segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePurpose {
    Profile,
    AnalysisBox(AnalysisSubject),
    DiaryOcr,
}

impl ImagePurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            ImagePurpose::Profile => "profile",
            ImagePurpose::AnalysisBox(_) => "analysis-box",
            ImagePurpose::DiaryOcr => "diary-ocr",
        }
    }

    /// Path segment under `users/{user_id}/`.
    pub fn path_segment(self) -> &'static str {
        match self {
            ImagePurpose::Profile => "profile",
            ImagePurpose::AnalysisBox(_) => "analyses",
            ImagePurpose::DiaryOcr => "diary-ocr",
        }
    }

    /// Suffix appended to the random token, only for analysis images.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            ImagePurpose::AnalysisBox(subject) => Some(subject.as_str()),
            _ => None,
        }
    }
}

/// An uploaded image, alive for one request only.
#[derive(Clone)]
pub struct ImageAsset {
    pub user_id: i64,
    pub purpose: ImagePurpose,
    pub content_type: String,
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ImageAsset")
            .field("user_id", &self.user_id)
            .field("purpose", &self.purpose)
            .field("content_type", &self.content_type)
            .field("filename", &self.filename)
            .field("size_bytes", &self.data.len())
            .finish()
    }
}

/// Map a stored profile image URL to what clients should display.
pub fn resolve_profile_image_url(stored: Option<&str>) -> String {
    match stored {
        None | Some("") | Some("base") => DEFAULT_PROFILE_IMAGE_URL.to_string(),
        Some(url) => url.to_string(),
    }
}
