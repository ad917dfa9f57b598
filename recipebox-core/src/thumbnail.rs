//! Recipe thumbnails: validating uploaded images and embedding them as
//! data URLs so they can be stored inline in the recipe record.

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{ImageFormat, ImageReader};

use crate::error::ThumbnailError;

/// Allowed image formats for thumbnails.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum size of an embedded thumbnail (2MB). The whole record, image
/// included, travels in every list response.
pub const MAX_FILE_SIZE: usize = 2 * 1024 * 1024;

/// Detect the image format and return its content type (e.g. "image/png").
pub fn validate_image(data: &[u8]) -> Result<&'static str, ThumbnailError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ThumbnailError::Unsupported(e.to_string()))?;

    let format = reader
        .format()
        .ok_or_else(|| ThumbnailError::Unsupported("could not detect image format".to_string()))?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ThumbnailError::Unsupported(format!(
            "{:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        )));
    }

    Ok(format.to_mime_type())
}

pub fn data_url(data: &[u8], content_type: &str) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(data))
}

pub fn is_data_url(thumbnail: &str) -> bool {
    thumbnail.starts_with("data:")
}

/// Validate image bytes and encode them as a data URL.
pub fn thumbnail_from_bytes(data: &[u8]) -> Result<String, ThumbnailError> {
    if data.len() > MAX_FILE_SIZE {
        return Err(ThumbnailError::TooLarge {
            size: data.len(),
            max: MAX_FILE_SIZE,
        });
    }
    let content_type = validate_image(data)?;
    Ok(data_url(data, content_type))
}

pub fn thumbnail_from_file(path: &Path) -> Result<String, ThumbnailError> {
    let data = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "embedding thumbnail");
    thumbnail_from_bytes(&data)
}
