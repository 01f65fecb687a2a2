//! Normalized depth buffers and their 8-bit texture encoding.

use crate::error::DepthMapError;

/// A row-major depth buffer with every sample in `[0, 1]`.
///
/// Produced once per loaded image and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    data: Vec<f32>,
    width: u32,
    height: u32,
}

impl DepthMap {
    /// Wraps an already normalized buffer.
    pub fn new(data: Vec<f32>, width: u32, height: u32) -> Result<Self, DepthMapError> {
        check_dimensions(data.len(), width, height)?;
        for (index, &value) in data.iter().enumerate() {
            if !value.is_finite() {
                return Err(DepthMapError::NonFinite { index });
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(DepthMapError::OutOfRange { index, value });
            }
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Normalizes raw estimator output so its minimum maps to 0 and its maximum to 1.
    pub fn from_raw(raw: &[f32], width: u32, height: u32) -> Result<Self, DepthMapError> {
        check_dimensions(raw.len(), width, height)?;
        if let Some(index) = raw.iter().position(|v| !v.is_finite()) {
            return Err(DepthMapError::NonFinite { index });
        }
        Ok(Self {
            data: normalize(raw),
            width,
            height,
        })
    }

    /// Returns the samples in row-major order.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of samples, `width * height`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; empty maps are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the sample at pixel `(x, y)`.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Encodes the map as RGBA8: the quantized depth in R, G and B, alpha 255.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.data.len() * 4);
        for &value in &self.data {
            let q = quantize(value);
            rgba.extend_from_slice(&[q, q, q, 255]);
        }
        rgba
    }
}

fn check_dimensions(len: usize, width: u32, height: u32) -> Result<(), DepthMapError> {
    if width == 0 || height == 0 {
        return Err(DepthMapError::Empty { width, height });
    }
    let expected = width as usize * height as usize;
    if len != expected {
        return Err(DepthMapError::SizeMismatch {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Min/max normalization into `[0, 1]`.
///
/// A constant buffer has zero range; the range is then treated as 1, so every
/// sample becomes 0.0.
/// Arithmetic runs in f64 so spans wider than `f32::MAX` stay finite.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn normalize(raw: &[f32]) -> Vec<f32> {
    let (min, max) = raw
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            let v = f64::from(v);
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    let range = if range > 0.0 { range } else { 1.0 };
    raw.iter()
        .map(|&v| ((f64::from(v) - min) / range).clamp(0.0, 1.0) as f32)
        .collect()
}

/// Quantizes a depth value to 8 bits: `round(v * 255)` clamped to `[0, 255]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantize(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Inverse of [`quantize`].
#[must_use]
pub fn dequantize(value: u8) -> f32 {
    f32::from(value) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_constant_buffer_normalizes_to_zero() {
        let raw = vec![0.42; 100 * 50];
        let map = DepthMap::from_raw(&raw, 100, 50).unwrap();
        assert!(map.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_normalize_endpoints() {
        let map = DepthMap::from_raw(&[3.0, 5.0, 4.0, 7.0], 2, 2).unwrap();
        assert_eq!(map.data(), &[0.0, 0.5, 0.25, 1.0]);
        assert_eq!(map.get(1, 1), Some(1.0));
        assert_eq!(map.get(2, 0), None);
    }

    #[test]
    fn test_extreme_span_stays_finite() {
        let map = DepthMap::from_raw(&[-3.0e38, 0.0, 3.0e38], 3, 1).unwrap();
        assert_eq!(map.data(), &[0.0, 0.5, 1.0]);

        let map = DepthMap::from_raw(&[f32::MIN, f32::MAX], 2, 1).unwrap();
        assert_eq!(map.data(), &[0.0, 1.0]);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let err = DepthMap::from_raw(&[0.0; 5], 2, 2).unwrap_err();
        assert_eq!(
            err,
            DepthMapError::SizeMismatch {
                expected: 4,
                actual: 5
            }
        );
    }

    #[test]
    fn test_empty_and_non_finite_rejected() {
        assert!(matches!(
            DepthMap::from_raw(&[], 0, 3),
            Err(DepthMapError::Empty { .. })
        ));
        assert!(matches!(
            DepthMap::from_raw(&[0.0, f32::NAN], 2, 1),
            Err(DepthMapError::NonFinite { index: 1 })
        ));
        assert!(matches!(
            DepthMap::new(vec![0.0, 1.5], 2, 1),
            Err(DepthMapError::OutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn test_quantize_clamps() {
        assert_eq!(quantize(-0.5), 0);
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.5), 128);
        assert_eq!(quantize(1.0), 255);
        assert_eq!(quantize(2.0), 255);
    }

    #[test]
    fn test_rgba_encoding() {
        let map = DepthMap::new(vec![0.0, 1.0], 2, 1).unwrap();
        assert_eq!(map.to_rgba8(), vec![0, 0, 0, 255, 255, 255, 255, 255]);
    }

    proptest! {
        #[test]
        fn prop_normalized_spans_unit_range(
            raw in prop::collection::vec(
                prop_oneof![
                    -1.0e4f32..1.0e4,
                    (-1.0f32..=1.0).prop_map(|v| v * f32::MAX),
                ],
                2..64,
            )
        ) {
            let min = raw.iter().copied().fold(f32::INFINITY, f32::min);
            let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            prop_assume!(max > min);
            let len = u32::try_from(raw.len()).unwrap();
            let map = DepthMap::from_raw(&raw, len, 1).unwrap();
            let lo = map.data().iter().copied().fold(f32::INFINITY, f32::min);
            let hi = map.data().iter().copied().fold(f32::NEG_INFINITY, f32::max);
            prop_assert!(map.data().iter().all(|v| (0.0..=1.0).contains(v)));
            prop_assert_eq!(lo, 0.0);
            prop_assert_eq!(hi, 1.0);
        }

        #[test]
        fn prop_quantize_round_trip(v in 0.0f32..=1.0) {
            let q = quantize(v);
            prop_assert!((dequantize(q) - v).abs() <= 1.0 / 255.0);
        }
    }
}
