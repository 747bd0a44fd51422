//! Graphics context wrapper.
//!
//! The state core never talks to a driver directly. Everything it needs from
//! the GPU is expressed by [`GraphicsContext`]:
//! - capability toggles and fixed-function state setters
//! - program binding, texture unit binding and uniform upload
//! - the driver's global error flag
//!
//! Backends:
//! - [`GlowContext`]: OpenGL through `glow` (native targets)
//! - [`RecordingContext`]: headless; records calls for tests and tooling

mod error;
#[cfg(not(target_arch = "wasm32"))]
mod glow_backend;
mod recorder;
mod types;

pub use error::GlError;
#[cfg(not(target_arch = "wasm32"))]
pub use glow_backend::GlowContext;
pub use recorder::{GlCall, RecordingContext};
pub use types::{BlendFactor, Capability, CullMode, Function, Operation, PolygonMode};

use crate::program::{Program, Sampler, Texture, TextureType, Uniform};

/// Primitive operations of the graphics context used by the state core.
///
/// Implementations issue the call unconditionally; redundancy elimination is
/// the caller's job. All methods must be called on the thread that owns the
/// context.
pub trait GraphicsContext {
    fn set_capability(&mut self, capability: Capability, enabled: bool);

    /// Selects the culled faces. Never called with `CullMode::None`; culling is
    /// switched off through `Capability::CullFace` instead.
    fn cull_face(&mut self, mode: CullMode);

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor);

    fn depth_mask(&mut self, enabled: bool);

    fn depth_func(&mut self, function: Function);

    /// Enables or disables writes to all four color channels.
    fn color_mask(&mut self, enabled: bool);

    fn stencil_func(&mut self, function: Function, reference: u32, mask: u32);

    fn stencil_op(&mut self, stencil_fail: Operation, depth_fail: Operation, depth_pass: Operation);

    fn polygon_mode(&mut self, mode: PolygonMode);

    fn line_width(&mut self, width: f32);

    fn use_program(&mut self, program: &Program);

    fn active_texture(&mut self, unit: u32);

    /// Binds `texture` (or unbinds, if `None`) on the active unit's `target`.
    fn bind_texture(&mut self, target: TextureType, texture: Option<&Texture>);

    /// Points a sampler uniform of the current program at a texture unit.
    fn set_sampler_unit(&mut self, sampler: &Sampler, unit: u32);

    /// Uploads `values` to the current program.
    ///
    /// `values` holds a whole number of elements and at most
    /// `uniform.element_count()` floats; a short slice updates leading array
    /// elements only.
    fn upload_uniform(&mut self, uniform: &Uniform, values: &[f32]);

    /// Returns and clears the driver's global error flag.
    fn take_error(&mut self) -> Option<GlError>;
}
