//! Uniform values.
//!
//! Two representations coexist:
//! - [`UniformValue`], a tagged value whose variant *is* its declared type; used
//!   where values travel without a buffer (shared program state).
//! - [`UniformData`], implemented by plain-old-data Rust types so per-instance
//!   values can be read from and written to the packed float buffer directly.

use bytemuck::Pod;

use super::uniform::UniformType;

/// A single uniform element tagged with its type.
///
/// Matrices are stored column-major.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

impl UniformValue {
    #[inline]
    pub fn ty(&self) -> UniformType {
        match self {
            UniformValue::Float(_) => UniformType::Float,
            UniformValue::Vec2(_) => UniformType::Vec2,
            UniformValue::Vec3(_) => UniformType::Vec3,
            UniformValue::Vec4(_) => UniformType::Vec4,
            UniformValue::Mat2(_) => UniformType::Mat2,
            UniformValue::Mat3(_) => UniformType::Mat3,
            UniformValue::Mat4(_) => UniformType::Mat4,
        }
    }

    #[inline]
    pub fn as_floats(&self) -> &[f32] {
        match self {
            UniformValue::Float(v) => std::slice::from_ref(v),
            UniformValue::Vec2(v) => v,
            UniformValue::Vec3(v) => v,
            UniformValue::Vec4(v) => v,
            UniformValue::Mat2(v) => v,
            UniformValue::Mat3(v) => v,
            UniformValue::Mat4(v) => v,
        }
    }

    /// Reinterprets the leading floats of `src` as a value of type `ty`.
    ///
    /// Returns `None` if `src` is too short.
    pub fn from_floats(ty: UniformType, src: &[f32]) -> Option<Self> {
        let src = src.get(..ty.float_count())?;
        let value = match ty {
            UniformType::Float => UniformValue::Float(src[0]),
            UniformType::Vec2 => UniformValue::Vec2(src.try_into().ok()?),
            UniformType::Vec3 => UniformValue::Vec3(src.try_into().ok()?),
            UniformType::Vec4 => UniformValue::Vec4(src.try_into().ok()?),
            UniformType::Mat2 => UniformValue::Mat2(src.try_into().ok()?),
            UniformType::Mat3 => UniformValue::Mat3(src.try_into().ok()?),
            UniformType::Mat4 => UniformValue::Mat4(src.try_into().ok()?),
        };
        Some(value)
    }
}

/// Rust value types that map one-to-one onto a uniform type.
///
/// The float layout of the value is exactly what the GPU expects for one
/// element of `TYPE`.
pub trait UniformData: Pod {
    const TYPE: UniformType;

    /// Writes `self` into the front of `dst`. Returns `false` if `dst` is too short.
    fn write_to(&self, dst: &mut [f32]) -> bool {
        let src: &[f32] = bytemuck::cast_slice(std::slice::from_ref(self));
        match dst.get_mut(..src.len()) {
            Some(dst) => {
                dst.copy_from_slice(src);
                true
            }
            None => false,
        }
    }

    /// Reads a value from the front of `src`. Returns `None` if `src` is too short.
    fn read_from(src: &[f32]) -> Option<Self> {
        let n = Self::TYPE.float_count();
        let src = src.get(..n)?;
        Some(bytemuck::pod_read_unaligned(bytemuck::cast_slice(src)))
    }
}

impl UniformData for f32 {
    const TYPE: UniformType = UniformType::Float;
}

impl UniformData for [f32; 2] {
    const TYPE: UniformType = UniformType::Vec2;
}

impl UniformData for [f32; 3] {
    const TYPE: UniformType = UniformType::Vec3;
}

impl UniformData for [f32; 4] {
    const TYPE: UniformType = UniformType::Vec4;
}

impl UniformData for [[f32; 2]; 2] {
    const TYPE: UniformType = UniformType::Mat2;
}

impl UniformData for [[f32; 3]; 3] {
    const TYPE: UniformType = UniformType::Mat3;
}

impl UniformData for [[f32; 4]; 4] {
    const TYPE: UniformType = UniformType::Mat4;
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<[[f32; 4]; 4]> for UniformValue {
    fn from(v: [[f32; 4]; 4]) -> Self {
        UniformValue::Mat4(bytemuck::cast(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_reports_its_type() {
        assert_eq!(UniformValue::Vec3([0.0; 3]).ty(), UniformType::Vec3);
        assert_eq!(UniformValue::Mat4([0.0; 16]).ty(), UniformType::Mat4);
    }

    #[test]
    fn from_floats_rejects_short_input() {
        assert_eq!(UniformValue::from_floats(UniformType::Vec4, &[1.0, 2.0]), None);
    }

    #[test]
    fn from_floats_uses_leading_floats_only() {
        let v = UniformValue::from_floats(UniformType::Vec2, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(v, UniformValue::Vec2([1.0, 2.0]));
    }

    #[test]
    fn matrix_data_is_written_column_major() {
        let m: [[f32; 2]; 2] = [[1.0, 2.0], [3.0, 4.0]];
        let mut buf = [0.0f32; 5];
        assert!(m.write_to(&mut buf));
        assert_eq!(buf, [1.0, 2.0, 3.0, 4.0, 0.0]);
        assert_eq!(<[[f32; 2]; 2]>::read_from(&buf), Some(m));
    }

    #[test]
    fn write_into_short_buffer_fails() {
        let mut buf = [0.0f32; 2];
        assert!(![1.0f32, 2.0, 3.0].write_to(&mut buf));
        assert_eq!(buf, [0.0, 0.0]);
    }

    #[test]
    fn mat4_conversion_flattens_columns() {
        let mut m = [[0.0f32; 4]; 4];
        m[3][0] = 7.0;
        let UniformValue::Mat4(flat) = UniformValue::from(m) else { panic!("expected mat4") };
        assert_eq!(flat[12], 7.0);
    }
}
