use anyhow::{Result, bail};

use crate::gl::{BlendFactor, CullMode, Function, Operation, PolygonMode};
use crate::state::RenderStateData;

// ── enum conversions ──────────────────────────────────────────────────────

impl From<BlendFactor> for wgpu::BlendFactor {
    fn from(factor: BlendFactor) -> Self {
        match factor {
            BlendFactor::Zero => wgpu::BlendFactor::Zero,
            BlendFactor::One => wgpu::BlendFactor::One,
            BlendFactor::SrcColor => wgpu::BlendFactor::Src,
            BlendFactor::DstColor => wgpu::BlendFactor::Dst,
            BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
            BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
            BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
            BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
            BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
            BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
        }
    }
}

impl From<Function> for wgpu::CompareFunction {
    fn from(function: Function) -> Self {
        match function {
            Function::Never => wgpu::CompareFunction::Never,
            Function::Always => wgpu::CompareFunction::Always,
            Function::Equal => wgpu::CompareFunction::Equal,
            Function::NotEqual => wgpu::CompareFunction::NotEqual,
            Function::Less => wgpu::CompareFunction::Less,
            Function::LessEqual => wgpu::CompareFunction::LessEqual,
            Function::Greater => wgpu::CompareFunction::Greater,
            Function::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
        }
    }
}

impl From<Operation> for wgpu::StencilOperation {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Keep => wgpu::StencilOperation::Keep,
            Operation::Zero => wgpu::StencilOperation::Zero,
            Operation::Replace => wgpu::StencilOperation::Replace,
            Operation::Increase => wgpu::StencilOperation::IncrementClamp,
            Operation::Decrease => wgpu::StencilOperation::DecrementClamp,
            Operation::Invert => wgpu::StencilOperation::Invert,
            Operation::IncreaseWrap => wgpu::StencilOperation::IncrementWrap,
            Operation::DecreaseWrap => wgpu::StencilOperation::DecrementWrap,
        }
    }
}

impl From<PolygonMode> for wgpu::PolygonMode {
    fn from(mode: PolygonMode) -> Self {
        match mode {
            PolygonMode::Fill => wgpu::PolygonMode::Fill,
            PolygonMode::Line => wgpu::PolygonMode::Line,
        }
    }
}

// ── pipeline state ────────────────────────────────────────────────────────

impl RenderStateData {
    /// Blend state for a color target; `None` when blending is off.
    ///
    /// Color and alpha use the same factors with additive combination.
    pub fn blend_state(&self) -> Option<wgpu::BlendState> {
        if !self.is_blending() {
            return None;
        }
        let component = wgpu::BlendComponent {
            src_factor: self.src_factor.into(),
            dst_factor: self.dst_factor.into(),
            operation: wgpu::BlendOperation::Add,
        };
        Some(wgpu::BlendState {
            color: component,
            alpha: component,
        })
    }

    #[inline]
    pub fn color_writes(&self) -> wgpu::ColorWrites {
        if self.color_writing {
            wgpu::ColorWrites::ALL
        } else {
            wgpu::ColorWrites::empty()
        }
    }

    /// Face culled under the given inversion flag.
    ///
    /// wgpu cannot cull both faces at once; that mode is an error.
    pub fn cull_face(&self, inverted: bool) -> Result<Option<wgpu::Face>> {
        match self.effective_cull_mode(inverted) {
            CullMode::None => Ok(None),
            CullMode::Front => Ok(Some(wgpu::Face::Front)),
            CullMode::Back => Ok(Some(wgpu::Face::Back)),
            CullMode::Both => bail!("culling both faces has no wgpu pipeline equivalent"),
        }
    }

    #[inline]
    pub fn polygon_mode(&self) -> wgpu::PolygonMode {
        PolygonMode::from_wireframe(self.wireframe).into()
    }

    /// Depth comparison, `Always` for write-only depth.
    ///
    /// With the depth buffer unused entirely the comparison is also `Always`.
    pub fn depth_compare(&self) -> wgpu::CompareFunction {
        if self.depth_testing {
            self.depth_function.into()
        } else {
            wgpu::CompareFunction::Always
        }
    }

    /// Stencil state for one face; pass-through when stencil testing is off.
    pub fn stencil_face_state(&self) -> wgpu::StencilFaceState {
        if !self.stencil_testing {
            return wgpu::StencilFaceState::IGNORE;
        }
        wgpu::StencilFaceState {
            compare: self.stencil_function.into(),
            fail_op: self.stencil_fail_op.into(),
            depth_fail_op: self.depth_fail_op.into(),
            pass_op: self.depth_pass_op.into(),
        }
    }

    /// Primitive state for triangle lists with counter-clockwise front faces.
    pub fn primitive_state(&self, inverted: bool) -> Result<wgpu::PrimitiveState> {
        Ok(wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: self.cull_face(inverted)?,
            polygon_mode: self.polygon_mode(),
            unclipped_depth: false,
            conservative: false,
        })
    }
}
