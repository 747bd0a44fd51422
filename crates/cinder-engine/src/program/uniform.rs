use super::texture::TextureType;

/// Location of a uniform inside a linked program, as reported by the driver.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation(pub u32);

/// Declared type of a float-valued uniform.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl UniformType {
    /// Number of floats occupied by a single element of this type.
    #[inline]
    pub const fn float_count(self) -> usize {
        match self {
            UniformType::Float => 1,
            UniformType::Vec2 => 2,
            UniformType::Vec3 => 3,
            UniformType::Vec4 => 4,
            UniformType::Mat2 => 4,
            UniformType::Mat3 => 9,
            UniformType::Mat4 => 16,
        }
    }

    /// GLSL spelling, used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            UniformType::Float => "float",
            UniformType::Vec2 => "vec2",
            UniformType::Vec3 => "vec3",
            UniformType::Vec4 => "vec4",
            UniformType::Mat2 => "mat2",
            UniformType::Mat3 => "mat3",
            UniformType::Mat4 => "mat4",
        }
    }
}

/// Declared type of a sampler uniform.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SamplerType {
    Sampler1D,
    Sampler2D,
    Sampler3D,
    SamplerCube,
}

impl SamplerType {
    /// The only texture kind this sampler can sample from.
    #[inline]
    pub const fn texture_type(self) -> TextureType {
        match self {
            SamplerType::Sampler1D => TextureType::Texture1D,
            SamplerType::Sampler2D => TextureType::Texture2D,
            SamplerType::Sampler3D => TextureType::Texture3D,
            SamplerType::SamplerCube => TextureType::TextureCube,
        }
    }

    #[inline]
    pub fn accepts(self, texture: TextureType) -> bool {
        self.texture_type() == texture
    }

    pub const fn name(self) -> &'static str {
        match self {
            SamplerType::Sampler1D => "sampler1D",
            SamplerType::Sampler2D => "sampler2D",
            SamplerType::Sampler3D => "sampler3D",
            SamplerType::SamplerCube => "samplerCube",
        }
    }
}

/// Static description of one non-sampler uniform of a linked program.
///
/// Immutable once the program is linked.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    name: String,
    ty: UniformType,
    count: usize,
    shared: bool,
    location: UniformLocation,
}

impl Uniform {
    pub fn new(name: impl Into<String>, ty: UniformType, location: UniformLocation) -> Self {
        Self {
            name: name.into(),
            ty,
            count: 1,
            shared: false,
            location,
        }
    }

    /// Declares an array uniform of `count` elements (clamped to at least 1).
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count.max(1);
        self
    }

    /// Marks the uniform as owned by the shared program state.
    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> UniformType {
        self.ty
    }

    /// Number of array elements (1 for non-arrays).
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.count > 1
    }

    #[inline]
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    #[inline]
    pub fn location(&self) -> UniformLocation {
        self.location
    }

    /// Number of floats this uniform occupies in a value buffer.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.ty.float_count() * self.count
    }
}

/// Static description of one sampler uniform of a linked program.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampler {
    name: String,
    ty: SamplerType,
    shared: bool,
    location: UniformLocation,
}

impl Sampler {
    pub fn new(name: impl Into<String>, ty: SamplerType, location: UniformLocation) -> Self {
        Self {
            name: name.into(),
            ty,
            shared: false,
            location,
        }
    }

    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> SamplerType {
        self.ty
    }

    #[inline]
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    #[inline]
    pub fn location(&self) -> UniformLocation {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_count_accounts_for_arrays() {
        let u = Uniform::new("lights", UniformType::Vec3, UniformLocation(2)).with_count(4);
        assert!(u.is_array());
        assert_eq!(u.element_count(), 12);
    }

    #[test]
    fn zero_count_is_clamped() {
        let u = Uniform::new("x", UniformType::Float, UniformLocation(0)).with_count(0);
        assert_eq!(u.count(), 1);
        assert_eq!(u.element_count(), 1);
    }

    #[test]
    fn matrix_float_counts() {
        assert_eq!(UniformType::Mat2.float_count(), 4);
        assert_eq!(UniformType::Mat3.float_count(), 9);
        assert_eq!(UniformType::Mat4.float_count(), 16);
    }

    #[test]
    fn sampler_accepts_only_matching_texture_kind() {
        assert!(SamplerType::Sampler2D.accepts(TextureType::Texture2D));
        assert!(!SamplerType::Sampler2D.accepts(TextureType::TextureCube));
        assert!(!SamplerType::Sampler3D.accepts(TextureType::Texture2D));
    }
}
