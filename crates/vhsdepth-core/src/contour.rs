//! CPU mirror of the contour banding and wave math used by the shaders.
//!
//! The WGSL passes evaluate the same expressions per pixel; keeping them here
//! lets the classification rules be tested without a GPU.

/// Scale from `lineThickness` to a half-width in band space.
pub const LINE_WIDTH_SCALE: f32 = 0.05;

/// Fractional band position, `(depth * count) mod 1`.
#[must_use]
pub fn band(depth: f32, contour_count: f32) -> f32 {
    let x = depth * contour_count;
    x - x.floor()
}

/// Half-width of a contour line in band space.
#[must_use]
pub fn line_half_width(line_thickness: f32) -> f32 {
    line_thickness * LINE_WIDTH_SCALE
}

/// Distance from `band` to the nearest band edge (0 or 1).
#[must_use]
pub fn edge_distance(band: f32) -> f32 {
    band.min(1.0 - band)
}

/// Whether a pixel at `depth` lies on a contour line.
#[must_use]
pub fn is_line(depth: f32, contour_count: f32, line_thickness: f32) -> bool {
    edge_distance(band(depth, contour_count)) < line_half_width(line_thickness)
}

/// Phase-shifted wave displacement: `amplitude * sin(frequency * coord + time * speed)`.
#[must_use]
pub fn wave_offset(coord: f32, time: f32, amplitude: f32, frequency: f32, speed: f32) -> f32 {
    amplitude * (frequency * coord + time * speed).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_midpoint_is_not_line() {
        assert!((band(0.05, 10.0) - 0.5).abs() < 1e-6);
        assert!(!is_line(0.05, 10.0, 1.8));
    }

    #[test]
    fn test_band_edge_is_line() {
        assert_eq!(band(0.0, 10.0), 0.0);
        assert!(is_line(0.0, 10.0, 1.8));
        // Just below a band edge also counts.
        assert!(is_line(0.099, 10.0, 1.8));
    }

    #[test]
    fn test_thickest_line_leaves_gap() {
        assert!(!is_line(0.05, 10.0, 5.0));
    }

    #[test]
    fn test_wave_offset() {
        assert_eq!(wave_offset(0.3, 0.0, 0.0, 60.0, 2.0), 0.0);
        let quarter = std::f32::consts::FRAC_PI_2;
        assert!((wave_offset(quarter, 0.0, 0.006, 1.0, 2.0) - 0.006).abs() < 1e-7);
        assert!((wave_offset(0.0, quarter, 0.01, 60.0, 1.0) - 0.01).abs() < 1e-7);
    }
}
