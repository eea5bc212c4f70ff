use aimind_core::constants::{LOSSY_QUALITY, WEBP_METHOD};
use aimind_core::ImageContentType;
use anyhow::{anyhow, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, GenericImageView};

/// Stateless encoders, one per allowed content type.
pub struct ImageCompressor;

impl ImageCompressor {
    pub fn encode(img: &DynamicImage, content_type: ImageContentType) -> Result<Vec<u8>> {
        match content_type {
            ImageContentType::Jpeg => Self::compress_jpeg(img),
            ImageContentType::Png => Self::compress_png(img),
            ImageContentType::WebP => Self::compress_webp(img),
        }
    }

    /// Compress to JPEG using mozjpeg
    fn compress_jpeg(img: &DynamicImage) -> Result<Vec<u8>> {
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(LOSSY_QUALITY as f32);
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let mut comp = comp.start_compress(Vec::new())?;
        comp.write_scanlines(&rgb_img)?;
        let jpeg_data = comp.finish()?;

        Ok(jpeg_data)
    }

    /// Lossless PNG, best compression, adaptive filtering.
    fn compress_png(img: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive);
        img.write_with_encoder(encoder)?;

        Ok(buffer)
    }

    fn compress_webp(img: &DynamicImage) -> Result<Vec<u8>> {
        let (width, height) = img.dimensions();

        let mut config = libwebp_sys::WebPConfig::new()
            .map_err(|_| anyhow!("Failed to initialise WebP config"))?;
        config.quality = LOSSY_QUALITY as f32;
        config.method = WEBP_METHOD;

        let webp_data = if img.color().has_alpha() {
            let rgba_img = img.to_rgba8();
            webp::Encoder::from_rgba(&rgba_img, width, height)
                .encode_advanced(&config)
                .map_err(|e| anyhow!("WebP encoding failed: {:?}", e))?
                .to_vec()
        } else {
            let rgb_img = img.to_rgb8();
            webp::Encoder::from_rgb(&rgb_img, width, height)
                .encode_advanced(&config)
                .map_err(|e| anyhow!("WebP encoding failed: {:?}", e))?
                .to_vec()
        };

        Ok(webp_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_jpeg_output_decodes() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([200, 10, 10])));
        let data = ImageCompressor::encode(&img, ImageContentType::Jpeg).unwrap();
        assert_eq!(&data[..2], &[0xFF, 0xD8]);
        let back = image::load_from_memory_with_format(&data, ImageFormat::Jpeg).unwrap();
        assert_eq!(back.dimensions(), (64, 48));
    }

    #[test]
    fn test_png_is_lossless() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 128])));
        let data = ImageCompressor::encode(&img, ImageContentType::Png).unwrap();
        let back = image::load_from_memory_with_format(&data, ImageFormat::Png).unwrap();
        assert_eq!(back.to_rgba8().get_pixel(5, 5), &Rgba([1, 2, 3, 128]));
    }

    #[test]
    fn test_webp_output() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([0, 128, 255])));
        let data = ImageCompressor::encode(&img, ImageContentType::WebP).unwrap();
        assert_eq!(&data[..4], b"RIFF");
        assert_eq!(&data[8..12], b"WEBP");
    }
}
