//! Image acquisition from files.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use vhsdepth_core::{AcquiredImage, AcquisitionError, ImageSource, SourceImage};

/// Dimensions scaled so the longer side equals `max_dimension`, or `None`
/// when the image already fits.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn resized_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if max_dimension == 0 || longest <= max_dimension {
        return None;
    }
    let scale = f64::from(max_dimension) / f64::from(longest);
    let w = (f64::from(width) * scale).round().max(1.0) as u32;
    let h = (f64::from(height) * scale).round().max(1.0) as u32;
    Some((w.min(max_dimension), h.min(max_dimension)))
}

/// Decodes an image file with the `image` crate.
#[derive(Debug, Clone)]
pub struct FileImageSource {
    path: PathBuf,
}

impl FileImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageSource for FileImageSource {
    fn acquire(&self, max_dimension: u32) -> Result<AcquiredImage, AcquisitionError> {
        let decoded = image::open(&self.path).map_err(|e| match e {
            image::ImageError::IoError(io) => AcquisitionError::Io(io),
            other => AcquisitionError::Decode(other.to_string()),
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("decoded {} ({width}x{height})", self.path.display());

        let resized = match resized_dimensions(width, height, max_dimension) {
            Some((w, h)) => {
                let small = image::imageops::resize(&rgba, w, h, FilterType::Triangle);
                log::debug!("resized for estimation to {w}x{h}");
                Some(SourceImage::new(w, h, small.into_raw())?)
            }
            None => None,
        };

        Ok(AcquiredImage {
            image: SourceImage::new(width, height, rgba.into_raw())?,
            resized,
            origin: Some(self.path.clone()),
        })
    }
}
