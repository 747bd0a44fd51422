use crate::gl::{BlendFactor, CullMode, Function, Operation};

/// One complete fixed-function pipeline configuration.
///
/// Two snapshots are compared field by field; the diffing in `RenderState::apply`
/// relies on that rather than on any combined hash.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStateData {
    pub depth_testing: bool,
    pub depth_writing: bool,
    pub color_writing: bool,
    pub stencil_testing: bool,
    pub wireframe: bool,
    pub line_smoothing: bool,
    pub multisampling: bool,
    pub line_width: f32,
    pub cull_mode: CullMode,
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
    pub depth_function: Function,
    pub stencil_function: Function,
    pub stencil_ref: u32,
    pub stencil_mask: u32,
    pub stencil_fail_op: Operation,
    pub depth_fail_op: Operation,
    pub depth_pass_op: Operation,
}

impl Default for RenderStateData {
    fn default() -> Self {
        Self {
            depth_testing: true,
            depth_writing: true,
            color_writing: true,
            stencil_testing: false,
            wireframe: false,
            line_smoothing: false,
            multisampling: true,
            line_width: 1.0,
            cull_mode: CullMode::Back,
            src_factor: BlendFactor::One,
            dst_factor: BlendFactor::Zero,
            depth_function: Function::Less,
            stencil_function: Function::Always,
            stencil_ref: 0,
            stencil_mask: !0,
            stencil_fail_op: Operation::Keep,
            depth_fail_op: Operation::Keep,
            depth_pass_op: Operation::Keep,
        }
    }
}

impl RenderStateData {
    /// Blending is on unless the factors are the identity pair ONE/ZERO.
    #[inline]
    pub fn is_blending(&self) -> bool {
        self.src_factor != BlendFactor::One || self.dst_factor != BlendFactor::Zero
    }

    /// The depth test capability is needed for either testing or writing.
    #[inline]
    pub fn uses_depth_buffer(&self) -> bool {
        self.depth_testing || self.depth_writing
    }

    /// Depth function actually sent to the GPU.
    ///
    /// Writing without testing still requires the test capability, so the
    /// comparison is forced to always pass; the requested function is ignored.
    #[inline]
    pub fn effective_depth_function(&self) -> Function {
        if self.depth_writing && !self.depth_testing {
            Function::Always
        } else {
            self.depth_function
        }
    }

    /// Cull mode actually sent to the GPU under the given inversion flag.
    #[inline]
    pub fn effective_cull_mode(&self, inverted: bool) -> CullMode {
        if inverted {
            self.cull_mode.inverted()
        } else {
            self.cull_mode
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_opaque_depth_tested_back_culled() {
        let d = RenderStateData::default();
        assert!(!d.is_blending());
        assert!(d.depth_testing && d.depth_writing);
        assert_eq!(d.cull_mode, CullMode::Back);
        assert_eq!(d.stencil_mask, u32::MAX);
    }

    #[test]
    fn blending_detection() {
        let mut d = RenderStateData::default();
        d.src_factor = BlendFactor::SrcAlpha;
        assert!(d.is_blending());
        d.src_factor = BlendFactor::One;
        d.dst_factor = BlendFactor::One;
        assert!(d.is_blending());
    }

    #[test]
    fn write_only_depth_forces_always() {
        let mut d = RenderStateData::default();
        d.depth_testing = false;
        d.depth_function = Function::Greater;
        assert_eq!(d.effective_depth_function(), Function::Always);
        d.depth_testing = true;
        assert_eq!(d.effective_depth_function(), Function::Greater);
    }

    #[test]
    fn snapshots_compare_structurally() {
        let a = RenderStateData::default();
        let mut b = a.clone();
        assert_eq!(a, b);
        b.line_width = 2.0;
        assert_ne!(a, b);
    }
}
