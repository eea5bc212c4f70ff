use std::sync::Arc;
use std::time::Duration;

use aimind_core::constants::MAX_IMAGE_BYTES;
use aimind_core::{ImageConfig, ImageContentType};
use aimind_processing::{ImageNormalizer, ImageUploader};
use aimind_storage::{InMemoryStorage, PublicUrlResolver};
use image::codecs::jpeg::JpegEncoder;
use image::{GenericImageView, Rgb, RgbImage};

const BUCKET: &str = "aimind-it";

/// Noise photo encoded at full quality; comfortably above 5 MiB.
fn oversized_jpeg() -> Vec<u8> {
    let mut state: u32 = 0x1234_5678;
    let img = RgbImage::from_fn(2400, 2000, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        Rgb([r, g, b])
    });
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 100)
        .encode_image(&img)
        .unwrap();
    out
}

#[test]
fn normalizer_brings_oversized_jpeg_under_budget() {
    let input = oversized_jpeg();
    assert!(input.len() > MAX_IMAGE_BYTES);

    let result = ImageNormalizer::default()
        .normalize(&input, ImageContentType::Jpeg)
        .unwrap();

    assert!(result.data.len() <= MAX_IMAGE_BYTES);
    assert!(result.width <= 1024 && result.height <= 1024);
    assert!(result.iterations <= 6);

    let decoded = image::load_from_memory(&result.data).unwrap();
    assert_eq!(decoded.dimensions(), (result.width, result.height));
}

#[tokio::test]
async fn profile_upload_normalizes_before_put() {
    let storage = InMemoryStorage::new();
    let uploader = ImageUploader::with_settings(
        Arc::new(storage.clone()),
        PublicUrlResolver::new(BUCKET, "us-east-1", None),
        BUCKET,
        ImageConfig::default(),
        Duration::from_secs(30),
    );

    let url = uploader
        .upload_profile_image(77, oversized_jpeg(), Some("image/jpeg"), Some("big.jpg"))
        .await
        .unwrap();

    let prefix = format!("https://{}.s3.amazonaws.com/", BUCKET);
    assert!(url.starts_with(&prefix));
    let key = &url[prefix.len()..];
    assert!(key.starts_with("users/77/profile/"));
    assert!(key.ends_with(".jpg"));

    let stored = storage.get(BUCKET, key).unwrap();
    assert!(stored.data.len() <= MAX_IMAGE_BYTES);
    let decoded = image::load_from_memory(&stored.data).unwrap();
    let (w, h) = decoded.dimensions();
    assert!(w <= 1024 && h <= 1024);
}
