use std::ops::{Deref, DerefMut};

use crate::gl::{
    BlendFactor, Capability, CullMode, Function, GraphicsContext, Operation, PolygonMode,
};

use super::data::RenderStateData;
use super::id_pool::StateIdPool;
use super::program_state::ProgramState;
use super::tracker::GraphicsStateTracker;

/// Fixed-function settings plus program values for one kind of draw.
///
/// `apply` moves the GPU to this state with the fewest calls the tracker's
/// cache allows. Program values are reachable through `Deref`:
///
/// ```ignore
/// let mut state = tracker.new_render_state();
/// state.set_program(Some(&program));
/// state.set_blend_factors(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
/// state.set_uniform_state("color", [1.0f32, 1.0, 1.0, 1.0]);
/// state.apply(&mut tracker, &mut gl);
/// ```
#[derive(Debug, Clone)]
pub struct RenderState {
    program_state: ProgramState,
    data: RenderStateData,
}

impl RenderState {
    pub fn new(ids: &StateIdPool) -> Self {
        Self {
            program_state: ProgramState::new(ids),
            data: RenderStateData::default(),
        }
    }

    /// The fixed-function settings this state applies.
    #[inline]
    pub fn render_data(&self) -> &RenderStateData {
        &self.data
    }

    #[inline]
    pub fn program_state(&self) -> &ProgramState {
        &self.program_state
    }

    /// Pushes this state to the GPU.
    ///
    /// A dirty tracker triggers a full re-sync; otherwise only fields that
    /// differ from the tracker's cache are emitted. Program values are always
    /// pushed afterwards. Returns `false` if the program part reported errors.
    pub fn apply(&self, tracker: &mut GraphicsStateTracker, gl: &mut dyn GraphicsContext) -> bool {
        tracker.stats_mut().applies += 1;

        if tracker.is_dirty() {
            return self.force(tracker, gl);
        }

        let inverted = tracker.is_culling_inverted();
        let mut w = StateWriter::new(gl);
        diff(&self.data, tracker.cache_mut(), inverted, &mut w);
        let calls = w.calls;
        tracker.stats_mut().state_calls += calls;

        tracker.check_errors(gl, "when applying render state");
        self.program_state.apply(tracker, gl)
    }

    /// Emits every fixed-function call regardless of the cache.
    fn force(&self, tracker: &mut GraphicsStateTracker, gl: &mut dyn GraphicsContext) -> bool {
        let d = &self.data;
        let cull = d.effective_cull_mode(tracker.is_culling_inverted());
        let depth_function = d.effective_depth_function();

        let mut w = StateWriter::new(gl);

        w.capability(Capability::CullFace, cull.is_culling());
        if cull.is_culling() {
            w.cull_face(cull);
        }

        w.capability(Capability::Blend, d.is_blending());
        w.blend_func(d.src_factor, d.dst_factor);

        w.depth_mask(d.depth_writing);
        w.capability(Capability::DepthTest, d.uses_depth_buffer());
        w.depth_func(depth_function);

        w.color_mask(d.color_writing);
        w.polygon_mode(PolygonMode::from_wireframe(d.wireframe));

        w.capability(Capability::LineSmooth, d.line_smoothing);
        w.line_width(d.line_width);

        w.capability(Capability::Multisample, d.multisampling);

        w.capability(Capability::StencilTest, d.stencil_testing);
        w.stencil_func(d.stencil_function, d.stencil_ref, d.stencil_mask);
        w.stencil_op(d.stencil_fail_op, d.depth_fail_op, d.depth_pass_op);

        let calls = w.calls;

        *tracker.cache_mut() = RenderStateData {
            cull_mode: cull,
            depth_function,
            ..d.clone()
        };
        tracker.mark_clean();
        let stats = tracker.stats_mut();
        stats.forced += 1;
        stats.state_calls += calls;
        log::debug!("forced full render state ({calls} calls)");

        tracker.check_errors(gl, "when forcing render state");
        self.program_state.apply(tracker, gl)
    }

    // ── predicates ────────────────────────────────────────────────────────

    #[inline]
    pub fn is_culling(&self) -> bool {
        self.data.cull_mode.is_culling()
    }

    #[inline]
    pub fn is_blending(&self) -> bool {
        self.data.is_blending()
    }

    #[inline]
    pub fn is_depth_testing(&self) -> bool {
        self.data.depth_testing
    }

    #[inline]
    pub fn is_depth_writing(&self) -> bool {
        self.data.depth_writing
    }

    #[inline]
    pub fn is_color_writing(&self) -> bool {
        self.data.color_writing
    }

    #[inline]
    pub fn is_stencil_testing(&self) -> bool {
        self.data.stencil_testing
    }

    #[inline]
    pub fn is_wireframe(&self) -> bool {
        self.data.wireframe
    }

    #[inline]
    pub fn is_line_smoothing(&self) -> bool {
        self.data.line_smoothing
    }

    #[inline]
    pub fn is_multisampling(&self) -> bool {
        self.data.multisampling
    }

    // ── getters ───────────────────────────────────────────────────────────

    #[inline]
    pub fn line_width(&self) -> f32 {
        self.data.line_width
    }

    #[inline]
    pub fn cull_mode(&self) -> CullMode {
        self.data.cull_mode
    }

    #[inline]
    pub fn src_factor(&self) -> BlendFactor {
        self.data.src_factor
    }

    #[inline]
    pub fn dst_factor(&self) -> BlendFactor {
        self.data.dst_factor
    }

    #[inline]
    pub fn depth_function(&self) -> Function {
        self.data.depth_function
    }

    #[inline]
    pub fn stencil_function(&self) -> Function {
        self.data.stencil_function
    }

    #[inline]
    pub fn stencil_reference(&self) -> u32 {
        self.data.stencil_ref
    }

    #[inline]
    pub fn stencil_write_mask(&self) -> u32 {
        self.data.stencil_mask
    }

    #[inline]
    pub fn stencil_fail_operation(&self) -> Operation {
        self.data.stencil_fail_op
    }

    #[inline]
    pub fn depth_fail_operation(&self) -> Operation {
        self.data.depth_fail_op
    }

    #[inline]
    pub fn depth_pass_operation(&self) -> Operation {
        self.data.depth_pass_op
    }

    // ── setters ───────────────────────────────────────────────────────────

    pub fn set_depth_testing(&mut self, enabled: bool) {
        self.data.depth_testing = enabled;
    }

    pub fn set_depth_writing(&mut self, enabled: bool) {
        self.data.depth_writing = enabled;
    }

    pub fn set_color_writing(&mut self, enabled: bool) {
        self.data.color_writing = enabled;
    }

    pub fn set_stencil_testing(&mut self, enabled: bool) {
        self.data.stencil_testing = enabled;
    }

    pub fn set_wireframe(&mut self, enabled: bool) {
        self.data.wireframe = enabled;
    }

    pub fn set_line_smoothing(&mut self, enabled: bool) {
        self.data.line_smoothing = enabled;
    }

    pub fn set_multisampling(&mut self, enabled: bool) {
        self.data.multisampling = enabled;
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.data.line_width = width;
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.data.cull_mode = mode;
    }

    /// ONE/ZERO disables blending.
    pub fn set_blend_factors(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.data.src_factor = src;
        self.data.dst_factor = dst;
    }

    /// Ignored while depth writing is on and depth testing off.
    pub fn set_depth_function(&mut self, function: Function) {
        self.data.depth_function = function;
    }

    pub fn set_stencil_function(&mut self, function: Function) {
        self.data.stencil_function = function;
    }

    pub fn set_stencil_reference(&mut self, reference: u32) {
        self.data.stencil_ref = reference;
    }

    pub fn set_stencil_write_mask(&mut self, mask: u32) {
        self.data.stencil_mask = mask;
    }

    pub fn set_stencil_fail_operation(&mut self, op: Operation) {
        self.data.stencil_fail_op = op;
    }

    pub fn set_depth_fail_operation(&mut self, op: Operation) {
        self.data.depth_fail_op = op;
    }

    pub fn set_depth_pass_operation(&mut self, op: Operation) {
        self.data.depth_pass_op = op;
    }
}

impl Deref for RenderState {
    type Target = ProgramState;

    fn deref(&self) -> &ProgramState {
        &self.program_state
    }
}

impl DerefMut for RenderState {
    fn deref_mut(&mut self) -> &mut ProgramState {
        &mut self.program_state
    }
}

/// Moves `cache` to `d`, emitting only calls for fields that differ.
fn diff(d: &RenderStateData, cache: &mut RenderStateData, inverted: bool, w: &mut StateWriter<'_>) {
    let cull = d.effective_cull_mode(inverted);
    if cull != cache.cull_mode {
        if cull.is_culling() != cache.cull_mode.is_culling() {
            w.capability(Capability::CullFace, cull.is_culling());
        }
        if cull.is_culling() {
            w.cull_face(cull);
        }
        cache.cull_mode = cull;
    }

    if d.src_factor != cache.src_factor || d.dst_factor != cache.dst_factor {
        if d.is_blending() != cache.is_blending() {
            w.capability(Capability::Blend, d.is_blending());
        }
        if d.is_blending() {
            w.blend_func(d.src_factor, d.dst_factor);
        }
        cache.src_factor = d.src_factor;
        cache.dst_factor = d.dst_factor;
    }

    // Mask and test capability are tracked separately so the GPU mask always
    // matches the cache, even while the depth buffer is unused.
    if d.uses_depth_buffer() != cache.uses_depth_buffer() {
        w.capability(Capability::DepthTest, d.uses_depth_buffer());
    }
    if d.depth_writing != cache.depth_writing {
        w.depth_mask(d.depth_writing);
    }
    if d.uses_depth_buffer() {
        let function = d.effective_depth_function();
        if function != cache.depth_function {
            w.depth_func(function);
            cache.depth_function = function;
        }
    }
    cache.depth_testing = d.depth_testing;
    cache.depth_writing = d.depth_writing;

    if d.color_writing != cache.color_writing {
        w.color_mask(d.color_writing);
        cache.color_writing = d.color_writing;
    }

    if d.stencil_testing != cache.stencil_testing {
        w.capability(Capability::StencilTest, d.stencil_testing);
        cache.stencil_testing = d.stencil_testing;
    }

    if d.stencil_testing {
        if d.stencil_function != cache.stencil_function
            || d.stencil_ref != cache.stencil_ref
            || d.stencil_mask != cache.stencil_mask
        {
            w.stencil_func(d.stencil_function, d.stencil_ref, d.stencil_mask);
            cache.stencil_function = d.stencil_function;
            cache.stencil_ref = d.stencil_ref;
            cache.stencil_mask = d.stencil_mask;
        }

        if d.stencil_fail_op != cache.stencil_fail_op
            || d.depth_fail_op != cache.depth_fail_op
            || d.depth_pass_op != cache.depth_pass_op
        {
            w.stencil_op(d.stencil_fail_op, d.depth_fail_op, d.depth_pass_op);
            cache.stencil_fail_op = d.stencil_fail_op;
            cache.depth_fail_op = d.depth_fail_op;
            cache.depth_pass_op = d.depth_pass_op;
        }
    }

    if d.wireframe != cache.wireframe {
        w.polygon_mode(PolygonMode::from_wireframe(d.wireframe));
        cache.wireframe = d.wireframe;
    }

    if d.line_smoothing != cache.line_smoothing {
        w.capability(Capability::LineSmooth, d.line_smoothing);
        cache.line_smoothing = d.line_smoothing;
    }

    if d.multisampling != cache.multisampling {
        w.capability(Capability::Multisample, d.multisampling);
        cache.multisampling = d.multisampling;
    }

    if d.line_width != cache.line_width {
        w.line_width(d.line_width);
        cache.line_width = d.line_width;
    }
}

/// Forwards fixed-function calls, tracing and counting them.
struct StateWriter<'a> {
    gl: &'a mut dyn GraphicsContext,
    calls: u64,
}

impl<'a> StateWriter<'a> {
    fn new(gl: &'a mut dyn GraphicsContext) -> Self {
        Self { gl, calls: 0 }
    }

    fn capability(&mut self, capability: Capability, enabled: bool) {
        log::trace!("{capability:?} -> {enabled}");
        self.calls += 1;
        self.gl.set_capability(capability, enabled);
    }

    fn cull_face(&mut self, mode: CullMode) {
        log::trace!("cull face {mode:?}");
        self.calls += 1;
        self.gl.cull_face(mode);
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        log::trace!("blend func {src:?}/{dst:?}");
        self.calls += 1;
        self.gl.blend_func(src, dst);
    }

    fn depth_mask(&mut self, enabled: bool) {
        log::trace!("depth mask {enabled}");
        self.calls += 1;
        self.gl.depth_mask(enabled);
    }

    fn depth_func(&mut self, function: Function) {
        log::trace!("depth func {function:?}");
        self.calls += 1;
        self.gl.depth_func(function);
    }

    fn color_mask(&mut self, enabled: bool) {
        log::trace!("color mask {enabled}");
        self.calls += 1;
        self.gl.color_mask(enabled);
    }

    fn stencil_func(&mut self, function: Function, reference: u32, mask: u32) {
        log::trace!("stencil func {function:?} ref={reference} mask={mask:#x}");
        self.calls += 1;
        self.gl.stencil_func(function, reference, mask);
    }

    fn stencil_op(
        &mut self,
        stencil_fail: Operation,
        depth_fail: Operation,
        depth_pass: Operation,
    ) {
        log::trace!("stencil op {stencil_fail:?}/{depth_fail:?}/{depth_pass:?}");
        self.calls += 1;
        self.gl.stencil_op(stencil_fail, depth_fail, depth_pass);
    }

    fn polygon_mode(&mut self, mode: PolygonMode) {
        log::trace!("polygon mode {mode:?}");
        self.calls += 1;
        self.gl.polygon_mode(mode);
    }

    fn line_width(&mut self, width: f32) {
        log::trace!("line width {width}");
        self.calls += 1;
        self.gl.line_width(width);
    }
}
