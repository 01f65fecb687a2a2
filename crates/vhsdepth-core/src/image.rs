//! Decoded source images.

use crate::error::AcquisitionError;

/// An RGBA8 image in row-major order, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl SourceImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AcquisitionError> {
        if width == 0 || height == 0 {
            return Err(AcquisitionError::Empty);
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(AcquisitionError::SizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// A single-color image.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Result<Self, AcquisitionError> {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(width, height, rgba)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Iterates pixels as `[r, g, b, a]`.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.rgba
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_image() {
        let image = SourceImage::solid(3, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(image.rgba().len(), 24);
        assert!(image.pixels().all(|px| px == [1, 2, 3, 4]));
    }

    #[test]
    fn test_rejects_bad_buffers() {
        assert!(matches!(
            SourceImage::new(2, 2, vec![0; 15]),
            Err(AcquisitionError::SizeMismatch {
                expected: 16,
                actual: 15
            })
        ));
        assert!(matches!(
            SourceImage::new(0, 2, vec![]),
            Err(AcquisitionError::Empty)
        ));
    }
}
