//! wgpu interop.
//!
//! Renderers built on wgpu bake fixed-function state into pipelines instead of
//! toggling it per draw. This module expresses a [`RenderStateData`] as the
//! matching wgpu pipeline pieces so one state description serves both paths.
//!
//! Convention:
//! - front faces are counter-clockwise, as in GL
//! - culling inversion is applied by the caller-supplied flag, not the tracker
//!
//! [`RenderStateData`]: crate::state::RenderStateData

mod pipeline;
