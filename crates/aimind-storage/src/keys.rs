//! Shared key generation for stored images.
//!
//! Key format: `users/{user_id}/{purpose_segment}/{token}[_{tag}]{ext}`.

use std::fmt;

use aimind_core::constants::{MAX_FALLBACK_EXTENSION_LEN, USER_NAMESPACE};
use aimind_core::{ImageContentType, ImagePurpose};

/// Path of a stored object within the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 128 random bits as 32 lowercase hex chars.
fn random_token() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

/// Extension of the last path component including the dot, lower-cased.
fn filename_extension(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.trim_start_matches('.').is_empty() || ext.is_empty() {
        return None;
    }
    let ext = format!(".{}", ext.to_lowercase());
    (ext.len() <= MAX_FALLBACK_EXTENSION_LEN).then_some(ext)
}

fn extension_for(purpose: ImagePurpose, content_type: &str, filename: Option<&str>) -> String {
    if let Some(ct) = ImageContentType::from_mime(content_type) {
        return ct.extension().to_string();
    }
    match purpose {
        ImagePurpose::Profile => filename.and_then(filename_extension).unwrap_or_default(),
        ImagePurpose::AnalysisBox(_) | ImagePurpose::DiaryOcr => {
            ImageContentType::Jpeg.extension().to_string()
        }
    }
}

/// Build a fresh object key. Every call yields a new random token.
pub fn build_key(
    user_id: i64,
    purpose: ImagePurpose,
    content_type: &str,
    filename: Option<&str>,
) -> ObjectKey {
    let ext = extension_for(purpose, content_type, filename);
    let token = random_token();
    let key = match purpose.tag() {
        Some(tag) => format!(
            "{}/{}/{}/{}_{}{}",
            USER_NAMESPACE,
            user_id,
            purpose.path_segment(),
            token,
            tag,
            ext
        ),
        None => format!(
            "{}/{}/{}/{}{}",
            USER_NAMESPACE,
            user_id,
            purpose.path_segment(),
            token,
            ext
        ),
    };
    ObjectKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aimind_core::AnalysisSubject;
    use std::collections::HashSet;

    #[test]
    fn test_profile_key_shape() {
        let key = build_key(42, ImagePurpose::Profile, "image/png", Some("me.PNG"));
        let key = key.as_str();
        assert!(key.starts_with("users/42/profile/"));
        assert!(key.ends_with(".png"));
        let token = key
            .trim_start_matches("users/42/profile/")
            .trim_end_matches(".png");
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_analysis_key_has_subject_tag() {
        let key = build_key(
            7,
            ImagePurpose::AnalysisBox(AnalysisSubject::House),
            "image/webp",
            None,
        );
        assert!(key.as_str().starts_with("users/7/analyses/"));
        assert!(key.as_str().ends_with("_house.webp"));
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let profile = build_key(1, ImagePurpose::Profile, "image/heic", Some("IMG_1.HEIC"));
        assert!(profile.as_str().ends_with(".heic"));

        let no_ext = build_key(1, ImagePurpose::Profile, "application/octet-stream", None);
        let last = no_ext.as_str().rsplit('/').next().unwrap();
        assert_eq!(last.len(), 32);

        let too_long = build_key(1, ImagePurpose::Profile, "", Some("a.verylongextension"));
        assert!(!too_long.as_str().contains(".verylong"));

        let diary = build_key(1, ImagePurpose::DiaryOcr, "image/gif", None);
        assert!(diary.as_str().starts_with("users/1/diary-ocr/"));
        assert!(diary.as_str().ends_with(".jpg"));
    }

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<_> = (0..1000)
            .map(|_| build_key(5, ImagePurpose::Profile, "image/jpeg", None))
            .collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_filename_extension() {
        assert_eq!(filename_extension("photo.JPEG"), Some(".jpeg".to_string()));
        assert_eq!(filename_extension("dir/archive.tar.gz"), Some(".gz".to_string()));
        assert_eq!(filename_extension(".hidden"), None);
        assert_eq!(filename_extension("noext"), None);
    }
}
