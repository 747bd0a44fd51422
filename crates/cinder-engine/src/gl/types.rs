/// Fixed-function capability toggled through `GraphicsContext::set_capability`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Capability {
    CullFace,
    Blend,
    DepthTest,
    StencilTest,
    LineSmooth,
    Multisample,
}

/// Which polygon faces are discarded by face culling.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum CullMode {
    /// No faces are culled.
    None,
    Front,
    #[default]
    Back,
    /// Every polygon is culled; only points and lines survive.
    Both,
}

impl CullMode {
    /// Returns the mode to use when rendering into a mirrored target.
    ///
    /// Front and back swap; "none" and "both" swap as well, since the set of
    /// culled faces is complemented. Applying this twice yields the same mode.
    #[inline]
    pub const fn inverted(self) -> Self {
        match self {
            CullMode::None => CullMode::Both,
            CullMode::Front => CullMode::Back,
            CullMode::Back => CullMode::Front,
            CullMode::Both => CullMode::None,
        }
    }

    #[inline]
    pub const fn is_culling(self) -> bool {
        !matches!(self, CullMode::None)
    }
}

/// Source/destination factor for the blend equation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    DstColor,
    SrcAlpha,
    DstAlpha,
    OneMinusSrcColor,
    OneMinusDstColor,
    OneMinusSrcAlpha,
    OneMinusDstAlpha,
}

/// Comparison function used by depth and stencil tests.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Function {
    Never,
    Always,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

/// Stencil buffer update operation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Operation {
    Keep,
    Zero,
    Replace,
    Increase,
    Decrease,
    Invert,
    IncreaseWrap,
    DecreaseWrap,
}

/// Polygon rasterization mode (applies to both faces).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

impl PolygonMode {
    #[inline]
    pub const fn from_wireframe(wireframe: bool) -> Self {
        if wireframe { PolygonMode::Line } else { PolygonMode::Fill }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CULL_MODES: [CullMode; 4] =
        [CullMode::None, CullMode::Front, CullMode::Back, CullMode::Both];

    #[test]
    fn cull_inversion_swaps_pairs() {
        assert_eq!(CullMode::None.inverted(), CullMode::Both);
        assert_eq!(CullMode::Both.inverted(), CullMode::None);
        assert_eq!(CullMode::Front.inverted(), CullMode::Back);
        assert_eq!(CullMode::Back.inverted(), CullMode::Front);
    }

    #[test]
    fn cull_inversion_is_an_involution() {
        for mode in ALL_CULL_MODES {
            assert_eq!(mode.inverted().inverted(), mode);
        }
    }

    #[test]
    fn only_none_disables_culling() {
        assert!(!CullMode::None.is_culling());
        assert!(CullMode::Front.is_culling());
        assert!(CullMode::Back.is_culling());
        assert!(CullMode::Both.is_culling());
    }

    #[test]
    fn polygon_mode_from_wireframe_flag() {
        assert_eq!(PolygonMode::from_wireframe(true), PolygonMode::Line);
        assert_eq!(PolygonMode::from_wireframe(false), PolygonMode::Fill);
    }
}
