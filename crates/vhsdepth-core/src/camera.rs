//! Orbit camera for the point-splat view.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3, Vec4};

/// Closest allowed orbit distance.
pub const MIN_DISTANCE: f32 = 1.0;
/// Farthest allowed orbit distance.
pub const MAX_DISTANCE: f32 = 10.0;
/// Distance after a reset.
pub const DEFAULT_DISTANCE: f32 = 3.0;
/// Vertical field of view in radians (45 degrees).
pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 100.0;

/// A camera parameterized by distance, pitch and yaw around a panned target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Radius of the orbit sphere, within `[MIN_DISTANCE, MAX_DISTANCE]`.
    pub distance: f32,
    /// Pitch in radians, within `[-pi/2, pi/2]`.
    pub rotation_x: f32,
    /// Yaw in radians, unbounded.
    pub rotation_y: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            distance: DEFAULT_DISTANCE,
            rotation_x: 0.0,
            rotation_y: 0.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl OrbitCamera {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores `{distance: 3, rotation: 0, pan: 0}`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Adds yaw and pitch (radians), then clamps pitch to `[-pi/2, pi/2]`.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.rotation_y += delta_yaw;
        self.rotation_x = (self.rotation_x + delta_pitch).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Moves the look-at target in its plane.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        self.pan_x += delta_x;
        self.pan_y += delta_y;
    }

    /// Changes the orbit distance, clamped to `[MIN_DISTANCE, MAX_DISTANCE]`.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// The point the camera looks at.
    #[must_use]
    pub fn target(&self) -> Vec3 {
        Vec3::new(self.pan_x, self.pan_y, 0.0)
    }

    /// Camera position on the orbit sphere, offset by the pan.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let (sin_x, cos_x) = self.rotation_x.sin_cos();
        let (sin_y, cos_y) = self.rotation_y.sin_cos();
        Vec3::new(
            self.distance * cos_x * sin_y + self.pan_x,
            self.distance * sin_x + self.pan_y,
            self.distance * cos_x * cos_y,
        )
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        look_at(self.eye(), self.target(), Vec3::Y, self.rotation_y)
    }

    /// Perspective projection for wgpu clip space (depth in `[0, 1]`).
    #[must_use]
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        Mat4::perspective_rh(FOV_Y, aspect, NEAR, FAR)
    }
}

/// Right-handed look-at built from an explicit orthonormal basis.
///
/// When the view direction is parallel to `up` (pitch at +-pi/2) the cross
/// product degenerates, so the right axis is taken from the yaw instead.
fn look_at(eye: Vec3, target: Vec3, up: Vec3, yaw: f32) -> Mat4 {
    let forward = (eye - target).normalize_or_zero();
    let mut right = up.cross(forward);
    if right.length_squared() < 1e-12 {
        let (sin_y, cos_y) = yaw.sin_cos();
        right = Vec3::new(cos_y, 0.0, -sin_y);
    }
    let right = right.normalize();
    let up = forward.cross(right);

    Mat4::from_cols(
        Vec4::new(right.x, up.x, forward.x, 0.0),
        Vec4::new(right.y, up.y, forward.y, 0.0),
        Vec4::new(right.z, up.z, forward.z, 0.0),
        Vec4::new(-right.dot(eye), -up.dot(eye), -forward.dot(eye), 1.0),
    )
}
