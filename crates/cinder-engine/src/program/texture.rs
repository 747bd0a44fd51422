/// Driver-side texture object name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureHandle(pub u32);

/// Dimensionality of a texture object; also selects the bind target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureType {
    Texture1D,
    Texture2D,
    Texture3D,
    TextureCube,
}

/// A texture created elsewhere (asset loading, render targets).
///
/// Render and program states only keep weak references to textures; the owner
/// decides their lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    name: String,
    kind: TextureType,
    handle: TextureHandle,
}

impl Texture {
    pub fn new(name: impl Into<String>, kind: TextureType, handle: TextureHandle) -> Self {
        Self {
            name: name.into(),
            kind,
            handle,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> TextureType {
        self.kind
    }

    #[inline]
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }
}
