use std::rc::Rc;

use crate::gl::GraphicsContext;
use crate::program::{Program, ProgramHandle, Texture, TextureHandle, TextureType};

use super::data::RenderStateData;
use super::id_pool::StateIdPool;
use super::program_state::ProgramState;
use super::render_state::RenderState;
use super::shared::SharedProgramState;

/// Tracker configuration.
///
/// Defaults suit development builds; release builds skip per-apply error queries.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Query the driver's error flag after every `RenderState::apply`.
    ///
    /// Each query can stall the pipeline on some drivers.
    pub check_errors: bool,

    /// Texture units available for sampler binding.
    ///
    /// A program whose sampler count exceeds this reports a configuration error
    /// for every sampler past the limit.
    pub max_texture_units: u32,

    /// Initial cull inversion flag (mirrored render targets).
    pub invert_culling: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            check_errors: cfg!(debug_assertions),
            max_texture_units: 16,
            invert_culling: false,
        }
    }
}

/// Counters accumulated by the tracker until `reset_stats`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct RenderStats {
    /// `RenderState::apply` calls.
    pub applies: u64,
    /// Applies that performed a full re-sync.
    pub forced: u64,
    /// Fixed-function calls emitted (capability toggles included).
    pub state_calls: u64,
    /// Configuration errors (missing names, type mismatches, missing shared state).
    pub config_errors: u64,
    /// Errors reported by the driver's error flag.
    pub gl_errors: u64,
}

/// Bookkeeping of the active texture unit and the texture bound on each unit.
#[derive(Debug)]
pub struct TextureUnits {
    active: Option<u32>,
    bound: Vec<Option<(TextureType, TextureHandle)>>,
}

impl TextureUnits {
    fn new(max_units: u32) -> Self {
        Self {
            active: None,
            bound: vec![None; max_units as usize],
        }
    }

    #[inline]
    pub fn max_units(&self) -> u32 {
        self.bound.len() as u32
    }

    /// Last unit made active through this tracker.
    #[inline]
    pub fn active(&self) -> Option<u32> {
        self.active
    }

    /// Texture currently bound on `unit`, as far as the tracker knows.
    pub fn bound(&self, unit: u32) -> Option<TextureHandle> {
        self.bound
            .get(unit as usize)
            .copied()
            .flatten()
            .map(|(_, handle)| handle)
    }

    /// Binds `texture` on `unit` for `target`, skipping redundant calls.
    ///
    /// Passing `None` unbinds whatever the unit holds. Returns `false` if the
    /// unit is out of range.
    pub fn bind(
        &mut self,
        gl: &mut dyn GraphicsContext,
        unit: u32,
        target: TextureType,
        texture: Option<&Texture>,
    ) -> bool {
        let Some(slot) = self.bound.get_mut(unit as usize) else {
            log::error!(
                "texture unit {unit} exceeds the {} configured units",
                self.bound.len()
            );
            return false;
        };

        let wanted = texture.map(|t| (target, t.handle()));
        if *slot == wanted {
            return true;
        }

        if self.active != Some(unit) {
            gl.active_texture(unit);
            self.active = Some(unit);
        }

        // Unbinding must address the target the old texture was bound to.
        let target = match (wanted, *slot) {
            (None, Some((previous, _))) => previous,
            _ => target,
        };
        gl.bind_texture(target, texture);
        *slot = wanted;
        true
    }

    fn reset(&mut self) {
        self.active = None;
        self.bound.iter_mut().for_each(|slot| *slot = None);
    }
}

/// Mirror of the GPU's current state, shared by every render state.
///
/// The GPU has a single current state, so one tracker exists per context. It is
/// owned by the render-thread driver and passed to every `apply`. The tracker
/// starts dirty: the first apply re-syncs the complete fixed-function state.
pub struct GraphicsStateTracker {
    config: TrackerConfig,
    cache: RenderStateData,
    dirty: bool,
    culling_inverted: bool,
    current_program: Option<ProgramHandle>,
    units: TextureUnits,
    shared: Option<Rc<dyn SharedProgramState>>,
    ids: StateIdPool,
    stats: RenderStats,
}

impl GraphicsStateTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            cache: RenderStateData::default(),
            dirty: true,
            culling_inverted: config.invert_culling,
            current_program: None,
            units: TextureUnits::new(config.max_texture_units),
            shared: None,
            ids: StateIdPool::new(),
            stats: RenderStats::default(),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Forgets everything known about the GPU state.
    ///
    /// Call after the context was lost or modified behind the tracker's back.
    /// The next `RenderState::apply` re-syncs every field.
    pub fn invalidate(&mut self) {
        log::debug!("render state cache invalidated");
        self.dirty = true;
        self.current_program = None;
        self.units.reset();
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The state last applied to the GPU (post-inversion, post-depth override).
    #[inline]
    pub fn cache(&self) -> &RenderStateData {
        &self.cache
    }

    #[inline]
    pub fn is_culling_inverted(&self) -> bool {
        self.culling_inverted
    }

    /// Inverts culling for subsequent applies (rendering into mirrored targets).
    ///
    /// Takes effect at the next apply; the cache keeps the previously sent mode
    /// so the flip is diffed like any other change.
    pub fn set_culling_inversion(&mut self, inverted: bool) {
        self.culling_inverted = inverted;
    }

    /// Registers the shared program state consulted for shared uniforms/samplers.
    pub fn set_shared_state(&mut self, shared: Option<Rc<dyn SharedProgramState>>) {
        self.shared = shared;
    }

    #[inline]
    pub fn shared_state(&self) -> Option<&Rc<dyn SharedProgramState>> {
        self.shared.as_ref()
    }

    #[inline]
    pub fn ids(&self) -> &StateIdPool {
        &self.ids
    }

    #[inline]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = RenderStats::default();
    }

    #[inline]
    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    #[inline]
    pub fn texture_units(&self) -> &TextureUnits {
        &self.units
    }

    /// Creates an empty program state drawing its ID from this tracker's pool.
    pub fn new_program_state(&self) -> ProgramState {
        ProgramState::new(&self.ids)
    }

    /// Creates a render state with default fixed-function settings.
    pub fn new_render_state(&self) -> RenderState {
        RenderState::new(&self.ids)
    }

    pub(crate) fn use_program(&mut self, gl: &mut dyn GraphicsContext, program: &Program) {
        if self.current_program == Some(program.handle()) {
            return;
        }
        gl.use_program(program);
        self.current_program = Some(program.handle());
    }

    #[inline]
    pub(crate) fn units_mut(&mut self) -> &mut TextureUnits {
        &mut self.units
    }

    #[inline]
    pub(crate) fn cache_mut(&mut self) -> &mut RenderStateData {
        &mut self.cache
    }

    #[inline]
    pub(crate) fn stats_mut(&mut self) -> &mut RenderStats {
        &mut self.stats
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn record_config_error(&mut self) {
        self.stats.config_errors += 1;
    }

    /// Drains the driver's error flag if error checking is enabled.
    pub(crate) fn check_errors(&mut self, gl: &mut dyn GraphicsContext, context: &str) {
        if !self.config.check_errors {
            return;
        }
        let Some(err) = gl.take_error() else {
            return;
        };
        log::error!("error {context}: {err}");
        self.stats.gl_errors += 1;

        // The driver's state is undefined after a fatal error.
        if err.is_fatal() {
            self.invalidate();
        }
    }
}

impl Default for GraphicsStateTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}
