//! Image dimension extraction.
//!
//! Reads only image headers so scanning large libraries stays cheap.

use std::path::Path;

use anyhow::Result;
use image::ImageReader;
use tracing::{trace, warn};

/// Error state marker for broken media files.
pub const ERROR_DIMENSION: u32 = 0;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif"];

pub fn is_image_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extracts image dimensions by reading only the header when possible.
    ///
    /// Returns `(0, 0)` for broken/unreadable files instead of erroring, so a
    /// single bad file never aborts a scan.
    pub fn extract_dimensions(path: &Path) -> Result<(u32, u32)> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if !is_image_extension(ext) {
            warn!("Unknown media type for extension: {}", ext);
            return Ok((ERROR_DIMENSION, ERROR_DIMENSION));
        }

        trace!("Extracting image dimensions from {:?}", path);
        match ImageReader::open(path) {
            Ok(reader) => match reader.into_dimensions() {
                Ok((width, height)) => {
                    trace!("Got dimensions {}x{} for {:?}", width, height, path);
                    Ok((width, height))
                }
                Err(e) => {
                    warn!("Failed to read image dimensions for {:?}: {}", path, e);
                    Ok((ERROR_DIMENSION, ERROR_DIMENSION))
                }
            },
            Err(e) => {
                warn!("Failed to open image {:?}: {}", path, e);
                Ok((ERROR_DIMENSION, ERROR_DIMENSION))
            }
        }
    }

    pub fn is_broken(dimensions: (u32, u32)) -> bool {
        dimensions.0 == ERROR_DIMENSION || dimensions.1 == ERROR_DIMENSION
    }
}
