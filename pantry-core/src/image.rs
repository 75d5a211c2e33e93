//! Image normalization for publication.
//!
//! Every image the site serves goes through one step: fit within a fixed
//! bounding box (downscale only) and re-encode as JPEG at fixed quality.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};

use crate::error::ImageError;

/// Maximum published width in pixels.
pub const MAX_WIDTH: u32 = 1200;

/// Maximum published height in pixels.
pub const MAX_HEIGHT: u32 = 800;

/// JPEG quality for re-encoded images (out of 100).
pub const JPEG_QUALITY: u8 = 85;

/// File extensions the watcher treats as source images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// A normalized, upload-ready image.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// JPEG bytes at [`JPEG_QUALITY`].
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Whether a filename carries one of the recognized image extensions
/// (case-insensitive).
pub fn is_image_filename(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Normalize a source image for publication.
///
/// Decodes the file (format guessed from content, not extension), downscales
/// it to fit within [`MAX_WIDTH`] x [`MAX_HEIGHT`] preserving aspect ratio if
/// it exceeds either bound, then re-encodes as JPEG at [`JPEG_QUALITY`]. An
/// image that already fits is re-encoded as-is, never upscaled.
///
/// Errors name the offending path so batch callers can report and skip the
/// single item.
pub fn normalize_image(path: &Path) -> Result<NormalizedImage, ImageError> {
    let reader = ImageReader::open(path)
        .map_err(|e| ImageError::Open {
            path: path.to_path_buf(),
            source: e,
        })?
        .with_guessed_format()
        .map_err(|e| ImageError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

    let img = reader.decode().map_err(|e| ImageError::Decode {
        path: path.to_path_buf(),
        source: e,
    })?;

    let (width, height) = (img.width(), img.height());
    let img = if width > MAX_WIDTH || height > MAX_HEIGHT {
        let resized = img.resize(MAX_WIDTH, MAX_HEIGHT, FilterType::Lanczos3);
        tracing::debug!(
            path = %path.display(),
            from_width = width,
            from_height = height,
            width = resized.width(),
            height = resized.height(),
            "downscaled image"
        );
        resized
    } else {
        img
    };

    encode_jpeg(&img, path)
}

fn encode_jpeg(img: &DynamicImage, path: &Path) -> Result<NormalizedImage, ImageError> {
    // JPEG has no alpha channel; flatten before encoding.
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| ImageError::Encode {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(NormalizedImage {
        bytes,
        width,
        height,
    })
}
