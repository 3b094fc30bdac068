//! Variant derivation for uploaded images.
//!
//! One decoded upload yields four in-memory artifacts: the optimized
//! original (downscaled to fit 1200x1200, re-encoded at quality 80), a
//! lossy WebP copy, a 300x300 center-cropped thumbnail and a medium
//! rendition bounded at 600px. Derivation is pure; callers stage the
//! bytes into storage afterwards.

use std::io::Cursor;

use derive_more::Display;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, Limits};

// ───── Constants ─────────────────────────────
/// Bounding box for the optimized original. Aspect ratio is preserved
/// and images already inside the box are never upscaled.
pub const MAX_WIDTH: u32 = 1200;
pub const MAX_HEIGHT: u32 = 1200;
/// Lossy re-encode quality for JPEG and WebP output.
pub const ENCODE_QUALITY: u8 = 80;
/// Thumbnails are exactly this square, center-cropped.
pub const THUMBNAIL_SIZE: u32 = 300;
/// Longest side of the medium rendition.
pub const MEDIUM_BOUND: u32 = 600;
/// Decode guard against decompression bombs.
const MAX_DECODE_DIMENSION: u32 = 16384;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[display("Image decode failed: {_0}")]
    DecodeFailed(String),
    #[display("Unsupported image format: {_0}")]
    UnsupportedFormat(String),
    #[display("Image encode failed: {_0}")]
    EncodeFailed(String),
    #[display("Image task failed: {_0}")]
    TaskFailed(String),
}

impl std::error::Error for MediaError {}

/// Encoded artifacts for one upload, plus the dimensions of the
/// optimized original.
#[derive(Debug, Clone)]
pub struct DerivedSet {
    pub primary: Vec<u8>,
    pub webp: Vec<u8>,
    pub thumbnail: Vec<u8>,
    pub medium: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Runs [`derive_variants_sync`] on the blocking pool.
pub async fn derive_variants(data: Vec<u8>, extension: &str) -> Result<DerivedSet, MediaError> {
    let extension = extension.to_string();
    tokio::task::spawn_blocking(move || derive_variants_sync(&data, &extension))
        .await
        .map_err(|e| MediaError::TaskFailed(e.to_string()))?
}

/// Decodes `data` and derives the full variant set.
///
/// CPU-bound; call inside `spawn_blocking` on async paths.
pub fn derive_variants_sync(data: &[u8], extension: &str) -> Result<DerivedSet, MediaError> {
    let format = format_for_extension(extension)?;
    let img = decode(data, format)?;

    let (w, h) = img.dimensions();
    let optimized = if w > MAX_WIDTH || h > MAX_HEIGHT {
        img.resize(MAX_WIDTH, MAX_HEIGHT, FilterType::Lanczos3)
    } else {
        img
    };
    let (width, height) = optimized.dimensions();

    let primary = encode(&optimized, extension)?;
    let webp = if extension == "webp" {
        primary.clone()
    } else {
        encode_webp(&optimized)?
    };

    let thumb_img = optimized.resize_to_fill(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);
    let thumbnail = encode(&thumb_img, extension)?;

    // An image already inside the medium bound is its own medium rendition.
    let medium = if width > MEDIUM_BOUND || height > MEDIUM_BOUND {
        let medium_img = optimized.resize(MEDIUM_BOUND, MEDIUM_BOUND, FilterType::Lanczos3);
        encode(&medium_img, extension)?
    } else {
        primary.clone()
    };

    Ok(DerivedSet {
        primary,
        webp,
        thumbnail,
        medium,
        width,
        height,
    })
}

/// Percentage saved by optimization, rounded to one decimal. Negative
/// when the re-encode grew the file; never clamped.
pub fn compression_ratio(original_size: u64, optimized_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    let ratio = (1.0 - optimized_size as f64 / original_size as f64) * 100.0;
    (ratio * 10.0).round() / 10.0
}

/// Renders a ratio the way clients display it, e.g. `23.5%` or `-3.4%`.
pub fn format_ratio(ratio: f64) -> String {
    format!("{:.1}%", ratio)
}

fn format_for_extension(extension: &str) -> Result<ImageFormat, MediaError> {
    match extension {
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        "gif" => Ok(ImageFormat::Gif),
        "webp" => Ok(ImageFormat::WebP),
        other => Err(MediaError::UnsupportedFormat(other.to_string())),
    }
}

fn decode(data: &[u8], format: ImageFormat) -> Result<DynamicImage, MediaError> {
    let mut reader = ImageReader::with_format(Cursor::new(data), format);
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DECODE_DIMENSION);
    limits.max_image_height = Some(MAX_DECODE_DIMENSION);
    reader.limits(limits);
    reader
        .decode()
        .map_err(|e| MediaError::DecodeFailed(e.to_string()))
}

fn encode(img: &DynamicImage, extension: &str) -> Result<Vec<u8>, MediaError> {
    let mut buf = Cursor::new(Vec::new());
    match extension {
        // JPEG has no alpha channel; flatten before encoding.
        "jpg" | "jpeg" => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, ENCODE_QUALITY);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| MediaError::EncodeFailed(e.to_string()))?;
        }
        // PNG and GIF re-encode losslessly; quality applies to JPEG and
        // WebP only.
        "png" => {
            img.write_to(&mut buf, ImageFormat::Png)
                .map_err(|e| MediaError::EncodeFailed(e.to_string()))?;
        }
        "gif" => {
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_to(&mut buf, ImageFormat::Gif)
                .map_err(|e| MediaError::EncodeFailed(e.to_string()))?;
        }
        "webp" => return encode_webp(img),
        other => return Err(MediaError::UnsupportedFormat(other.to_string())),
    }
    Ok(buf.into_inner())
}

fn encode_webp(img: &DynamicImage) -> Result<Vec<u8>, MediaError> {
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    let encoder = webp::Encoder::from_rgba(&rgba, w, h);
    Ok(encoder.encode(ENCODE_QUALITY as f32).to_vec())
}
