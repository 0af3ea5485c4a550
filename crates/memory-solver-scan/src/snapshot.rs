//! Snapshot production for accepted cells.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use memory_solver_core::{Frame, PixelRect, SnapshotFormat};

use crate::{ScanError, Snapshot};

/// Crops `rect` from the full-resolution `frame`, resamples it to the
/// snapshot size, and encodes it as JPEG.
///
/// # Errors
/// Returns [`ScanError::CropOutOfBounds`] when `rect` does not fit the frame
/// and [`ScanError::Encode`] when JPEG encoding fails.
pub fn encode_snapshot(
    frame: &Frame,
    rect: PixelRect,
    format: &SnapshotFormat,
) -> Result<Snapshot, ScanError> {
    let crop = frame.crop_rgba(rect).ok_or(ScanError::CropOutOfBounds)?;
    let crop = RgbaImage::from_raw(rect.width, rect.height, crop).ok_or(ScanError::CropOutOfBounds)?;

    let resized = imageops::resize(&crop, format.width, format.height, FilterType::Triangle);
    let rgb = DynamicImage::ImageRgba8(resized).to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, format.jpeg_quality).encode_image(&rgb)?;

    Ok(Snapshot::from_jpeg(format.width, format.height, jpeg))
}
