//! Public URL resolution for stored objects.

use aimind_core::constants::DEFAULT_S3_REGION;
use aimind_core::StorageConfig;

/// Maps object keys to publicly retrievable URLs.
///
/// Resolution is a pure function of the configuration captured at construction
/// and the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrlResolver {
    bucket: String,
    region: String,
    public_base_url: Option<String>,
}

impl PublicUrlResolver {
    pub fn new(
        bucket: impl Into<String>,
        region: impl Into<String>,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            public_base_url: public_base_url.map(|base| base.trim_end_matches('/').to_string()),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.bucket.clone(),
            config.region.clone(),
            config.public_base_url.clone(),
        )
    }

    pub fn resolve(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{}", base, key),
            None if self.region == DEFAULT_S3_REGION => {
                format!("https://{}.s3.amazonaws.com/{}", self.bucket, key)
            }
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::build_key;
    use aimind_core::ImagePurpose;

    #[test]
    fn test_public_base_url_wins() {
        let resolver = PublicUrlResolver::new(
            "bucket",
            "ap-northeast-2",
            Some("https://cdn.example.com/".to_string()),
        );
        assert_eq!(
            resolver.resolve("users/1/profile/a.jpg"),
            "https://cdn.example.com/users/1/profile/a.jpg"
        );
    }

    #[test]
    fn test_us_east_1_has_no_region() {
        let resolver = PublicUrlResolver::new("bucket", "us-east-1", None);
        assert_eq!(
            resolver.resolve("k.png"),
            "https://bucket.s3.amazonaws.com/k.png"
        );
    }

    #[test]
    fn test_regional_url() {
        let resolver = PublicUrlResolver::new("aimind", "ap-northeast-2", None);
        assert_eq!(
            resolver.resolve("users/2/diary-ocr/x.jpg"),
            "https://aimind.s3.ap-northeast-2.amazonaws.com/users/2/diary-ocr/x.jpg"
        );
    }

    #[test]
    fn test_resolution_is_pure() {
        let resolver = PublicUrlResolver::new("aimind", "eu-west-1", None);
        let key = build_key(3, ImagePurpose::Profile, "image/jpeg", None);
        let first = resolver.resolve(key.as_str());
        let second = resolver.resolve(key.as_str());
        assert_eq!(first, second);
        assert!(first.ends_with(key.as_str()));
    }
}
