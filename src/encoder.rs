//! JPEG serialization of the finished canvas.
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::buffer::ConvertBuffer;
use image::{RgbImage, RgbaImage};
use tracing::*;

use crate::GridError;

/// Maps a quality fraction in `0.0..=1.0` onto the encoder's 1-100 scale.
fn encoder_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encodes `canvas` as a JPEG at `quality`, a fraction between 0 and 1.
/// Alpha is dropped.
///
/// # Errors
/// Returns [`GridError::Encode`] if the encoder rejects the image.
pub fn encode_jpeg(canvas: &RgbaImage, quality: f32) -> Result<Vec<u8>, GridError> {
    let quality = encoder_quality(quality);
    let rgb: RgbImage = canvas.convert();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(&rgb)
        .map_err(GridError::Encode)?;
    debug!("Encoded {} bytes at quality {}", buffer.len(), quality);
    Ok(buffer)
}

/// Encodes `canvas` and writes it to `output`.
///
/// The whole file is encoded in memory first, so an encoder failure never
/// leaves a partial file behind.
///
/// # Errors
/// Returns [`GridError::Encode`] on encoder failure and [`GridError::Io`] if
/// the destination cannot be written.
pub fn save_jpeg(canvas: &RgbaImage, quality: f32, output: &Path) -> Result<(), GridError> {
    let bytes = encode_jpeg(canvas, quality)?;
    std::fs::write(output, bytes).map_err(|source| {
        error!("Failed to write {}: {}", output.display(), source);
        GridError::Io {
            path: output.to_path_buf(),
            source,
        }
    })
}
