//! Program, uniform and texture descriptors.
//!
//! These are produced by program linking (see `gl::GlowContext::link_program`)
//! or constructed directly by other backends, and consumed read-only by the
//! state core. Programs and textures are shared through `Rc`; states only hold
//! weak references to them.

mod program;
mod texture;
mod uniform;
mod value;

pub use program::{Program, ProgramHandle};
pub use texture::{Texture, TextureHandle, TextureType};
pub use uniform::{Sampler, SamplerType, Uniform, UniformLocation, UniformType};
pub use value::{UniformData, UniformValue};
