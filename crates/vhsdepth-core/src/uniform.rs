//! Typed uniform values.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// A value for a named shader uniform, tagged by shape at the call site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major 4x4 matrix.
    Mat4([f32; 16]),
}

impl UniformValue {
    /// Number of scalar components.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            UniformValue::Float(_) => 1,
            UniformValue::Vec2(_) => 2,
            UniformValue::Vec3(_) => 3,
            UniformValue::Vec4(_) => 4,
            UniformValue::Mat4(_) => 16,
        }
    }

    /// Components as a flat slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        match self {
            UniformValue::Float(v) => std::slice::from_ref(v),
            UniformValue::Vec2(v) => v,
            UniformValue::Vec3(v) => v,
            UniformValue::Vec4(v) => v,
            UniformValue::Mat4(v) => v,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v.to_array())
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v.to_array())
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v.to_array())
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        UniformValue::Mat4(m.to_cols_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_matches_slice() {
        let values = [
            UniformValue::from(1.0),
            UniformValue::from(Vec2::ONE),
            UniformValue::from(Vec3::ONE),
            UniformValue::from(Vec4::ONE),
            UniformValue::from(Mat4::IDENTITY),
        ];
        for value in values {
            assert_eq!(value.arity(), value.as_slice().len());
        }
    }

    #[test]
    fn test_mat4_is_column_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let UniformValue::Mat4(cols) = UniformValue::from(m) else {
            panic!("expected matrix");
        };
        assert_eq!(&cols[12..15], &[1.0, 2.0, 3.0]);
    }
}
