use crate::program::{Program, ProgramHandle, Sampler, Texture, TextureHandle, TextureType, Uniform};

use super::{
    BlendFactor, Capability, CullMode, Function, GlError, GraphicsContext, Operation, PolygonMode,
};

/// One call received by a [`RecordingContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    SetCapability(Capability, bool),
    CullFace(CullMode),
    BlendFunc(BlendFactor, BlendFactor),
    DepthMask(bool),
    DepthFunc(Function),
    ColorMask(bool),
    StencilFunc {
        function: Function,
        reference: u32,
        mask: u32,
    },
    StencilOp {
        stencil_fail: Operation,
        depth_fail: Operation,
        depth_pass: Operation,
    },
    PolygonMode(PolygonMode),
    LineWidth(f32),
    UseProgram(ProgramHandle),
    ActiveTexture(u32),
    BindTexture(TextureType, Option<TextureHandle>),
    SetSamplerUnit {
        sampler: String,
        unit: u32,
    },
    UploadUniform {
        uniform: String,
        values: Vec<f32>,
    },
}

impl GlCall {
    /// True for calls that change fixed-function pipeline state.
    pub fn is_fixed_function(&self) -> bool {
        !matches!(
            self,
            GlCall::UseProgram(_)
                | GlCall::ActiveTexture(_)
                | GlCall::BindTexture(..)
                | GlCall::SetSamplerUnit { .. }
                | GlCall::UploadUniform { .. }
        )
    }
}

/// Headless graphics context that records every call.
///
/// Useful for tests and for tools that need to inspect what a frame would
/// submit without a GPU.
#[derive(Debug, Default)]
pub struct RecordingContext {
    calls: Vec<GlCall>,
    pending_error: Option<GlError>,
}

impl RecordingContext {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns calls in submission order.
    #[inline]
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Returns recorded calls and starts a fresh recording.
    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn fixed_function_calls(&self) -> impl Iterator<Item = &GlCall> {
        self.calls.iter().filter(|c| c.is_fixed_function())
    }

    pub fn fixed_function_call_count(&self) -> usize {
        self.fixed_function_calls().count()
    }

    /// Makes the next `take_error` report `error`, as a driver would.
    pub fn inject_error(&mut self, error: GlError) {
        self.pending_error = Some(error);
    }
}

impl GraphicsContext for RecordingContext {
    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        self.calls.push(GlCall::SetCapability(capability, enabled));
    }

    fn cull_face(&mut self, mode: CullMode) {
        self.calls.push(GlCall::CullFace(mode));
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.calls.push(GlCall::BlendFunc(src, dst));
    }

    fn depth_mask(&mut self, enabled: bool) {
        self.calls.push(GlCall::DepthMask(enabled));
    }

    fn depth_func(&mut self, function: Function) {
        self.calls.push(GlCall::DepthFunc(function));
    }

    fn color_mask(&mut self, enabled: bool) {
        self.calls.push(GlCall::ColorMask(enabled));
    }

    fn stencil_func(&mut self, function: Function, reference: u32, mask: u32) {
        self.calls.push(GlCall::StencilFunc { function, reference, mask });
    }

    fn stencil_op(
        &mut self,
        stencil_fail: Operation,
        depth_fail: Operation,
        depth_pass: Operation,
    ) {
        self.calls.push(GlCall::StencilOp { stencil_fail, depth_fail, depth_pass });
    }

    fn polygon_mode(&mut self, mode: PolygonMode) {
        self.calls.push(GlCall::PolygonMode(mode));
    }

    fn line_width(&mut self, width: f32) {
        self.calls.push(GlCall::LineWidth(width));
    }

    fn use_program(&mut self, program: &Program) {
        self.calls.push(GlCall::UseProgram(program.handle()));
    }

    fn active_texture(&mut self, unit: u32) {
        self.calls.push(GlCall::ActiveTexture(unit));
    }

    fn bind_texture(&mut self, target: TextureType, texture: Option<&Texture>) {
        self.calls.push(GlCall::BindTexture(target, texture.map(Texture::handle)));
    }

    fn set_sampler_unit(&mut self, sampler: &Sampler, unit: u32) {
        self.calls.push(GlCall::SetSamplerUnit {
            sampler: sampler.name().to_owned(),
            unit,
        });
    }

    fn upload_uniform(&mut self, uniform: &Uniform, values: &[f32]) {
        self.calls.push(GlCall::UploadUniform {
            uniform: uniform.name().to_owned(),
            values: values.to_vec(),
        });
    }

    fn take_error(&mut self) -> Option<GlError> {
        self.pending_error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_submission_order() {
        let mut gl = RecordingContext::new();
        gl.set_capability(Capability::Blend, true);
        gl.blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
        gl.active_texture(2);

        assert_eq!(
            gl.calls(),
            &[
                GlCall::SetCapability(Capability::Blend, true),
                GlCall::BlendFunc(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
                GlCall::ActiveTexture(2),
            ]
        );
        assert_eq!(gl.fixed_function_call_count(), 2);
    }

    #[test]
    fn injected_error_is_reported_once() {
        let mut gl = RecordingContext::new();
        gl.inject_error(GlError::InvalidEnum);
        assert_eq!(gl.take_error(), Some(GlError::InvalidEnum));
        assert_eq!(gl.take_error(), None);
    }

    #[test]
    fn take_calls_resets_recording() {
        let mut gl = RecordingContext::new();
        gl.line_width(2.0);
        assert_eq!(gl.take_calls(), vec![GlCall::LineWidth(2.0)]);
        assert!(gl.calls().is_empty());
    }
}
