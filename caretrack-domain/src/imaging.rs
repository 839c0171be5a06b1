//! Attachment normalization.
//!
//! Uploaded reading images are decoded, downscaled to a manageable width
//! and re-encoded under the uploads directory. The returned path is what
//! gets recorded on the reading.

use image::imageops::FilterType;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Maximum width of a stored attachment
const MAX_WIDTH: u32 = 800;

/// Image handling errors
#[derive(Debug, Error)]
pub enum ImagingError {
    /// Bytes did not decode as a supported image format
    #[error("Unsupported or corrupt image data: {0}")]
    Decode(String),

    /// Filesystem failure while storing the processed image
    #[error("Failed to store processed image: {0}")]
    Io(#[from] std::io::Error),

    /// Encoder failure
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Normalize an uploaded medical image and store it under
/// `<uploads_dir>/processed/`. Returns the stored path.
pub fn process_medical_image(bytes: &[u8], uploads_dir: &Path) -> Result<PathBuf, ImagingError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| ImagingError::Decode(e.to_string()))?;

    let normalized = if decoded.width() > MAX_WIDTH {
        decoded.resize(MAX_WIDTH, u32::MAX, FilterType::Lanczos3)
    } else {
        decoded
    };

    let processed_dir = uploads_dir.join("processed");
    fs::create_dir_all(&processed_dir)?;

    let output_path = processed_dir.join(format!("{}-processed.png", Uuid::new_v4()));
    normalized
        .save(&output_path)
        .map_err(|e| ImagingError::Encode(e.to_string()))?;

    debug!("Stored processed image at {}", output_path.display());
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb::<u8>([120, 40, 40]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(buffer)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("caretrack-imaging-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let dir = scratch_dir();
        let path = process_medical_image(&sample_png(1600, 1200), &dir).unwrap();

        let stored = image::open(&path).unwrap();
        assert_eq!(stored.width(), MAX_WIDTH);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_small_image_keeps_dimensions() {
        let dir = scratch_dir();
        let path = process_medical_image(&sample_png(200, 100), &dir).unwrap();

        let stored = image::open(&path).unwrap();
        assert_eq!(stored.width(), 200);
        assert_eq!(stored.height(), 100);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let dir = scratch_dir();
        let result = process_medical_image(b"definitely not an image", &dir);
        assert!(matches!(result, Err(ImagingError::Decode(_))));
        fs::remove_dir_all(dir).unwrap();
    }
}
