//! Point-splat geometry.
//!
//! The splat vertex shader derives every point from its instance index; these
//! functions are the same mapping on the CPU.

use glam::Vec3;

/// One point per depth pixel.
#[must_use]
pub fn point_count(width: u32, height: u32) -> u32 {
    width.saturating_mul(height)
}

/// Pixel coordinate of the point with the given instance index.
#[must_use]
pub fn point_pixel(index: u32, width: u32) -> (u32, u32) {
    let width = width.max(1);
    (index % width, index / width)
}

/// Object-space position of a point.
///
/// The image spans `[-aspect, aspect] x [-1, 1]` in the XY plane, top row at
/// +Y. Depth displaces along +Z (towards the default camera), centered so a
/// depth of 0.5 sits on the plane.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn point_position(index: u32, width: u32, height: u32, depth: f32, depth_scale: f32) -> Vec3 {
    let (px, py) = point_pixel(index, width);
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    let u = (px as f32 + 0.5) / w;
    let v = (py as f32 + 0.5) / h;
    let aspect = w / h;
    Vec3::new(
        (u - 0.5) * 2.0 * aspect,
        (0.5 - v) * 2.0,
        (depth - 0.5) * depth_scale,
    )
}
