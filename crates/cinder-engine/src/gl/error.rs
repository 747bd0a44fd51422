use std::fmt;

/// Error flag reported by the driver's global error state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GlError {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    InvalidFramebufferOperation,
    OutOfMemory,
    StackOverflow,
    StackUnderflow,
    /// Vendor-specific or otherwise unrecognized error code.
    Other(u32),
}

impl GlError {
    /// Maps a raw GL error code. Returns `None` for `GL_NO_ERROR`.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => None,
            0x0500 => Some(GlError::InvalidEnum),
            0x0501 => Some(GlError::InvalidValue),
            0x0502 => Some(GlError::InvalidOperation),
            0x0503 => Some(GlError::StackOverflow),
            0x0504 => Some(GlError::StackUnderflow),
            0x0505 => Some(GlError::OutOfMemory),
            0x0506 => Some(GlError::InvalidFramebufferOperation),
            other => Some(GlError::Other(other)),
        }
    }

    /// Fatal errors leave the context in an undefined state.
    #[inline]
    pub fn is_fatal(self) -> bool {
        matches!(self, GlError::OutOfMemory)
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlError::InvalidEnum => f.write_str("invalid enum"),
            GlError::InvalidValue => f.write_str("invalid value"),
            GlError::InvalidOperation => f.write_str("invalid operation"),
            GlError::InvalidFramebufferOperation => f.write_str("invalid framebuffer operation"),
            GlError::OutOfMemory => f.write_str("out of memory"),
            GlError::StackOverflow => f.write_str("stack overflow"),
            GlError::StackUnderflow => f.write_str("stack underflow"),
            GlError::Other(code) => write!(f, "unknown error 0x{code:04x}"),
        }
    }
}

impl std::error::Error for GlError {}
