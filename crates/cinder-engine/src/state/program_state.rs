use std::rc::{Rc, Weak};

use crate::gl::GraphicsContext;
use crate::program::{Program, Texture, UniformData, UniformType, UniformValue};

use super::id_pool::{StateId, StateIdPool};
use super::index::{SamplerStateIndex, UniformStateIndex};
use super::tracker::GraphicsStateTracker;

/// Per-instance values of one program's non-shared uniforms and samplers.
///
/// Uniform values live in one packed float buffer laid out in the program's
/// uniform order, shared uniforms skipped. Textures are held weakly, one slot
/// per non-shared sampler.
///
/// Setters and getters never panic on bad names or types: they log the problem
/// and leave the state as it was.
#[derive(Debug)]
pub struct ProgramState {
    id: StateId,
    program: Option<Weak<Program>>,
    floats: Vec<f32>,
    textures: Vec<Option<Weak<Texture>>>,
}

impl ProgramState {
    pub fn new(ids: &StateIdPool) -> Self {
        Self {
            id: ids.allocate(),
            program: None,
            floats: Vec::new(),
            textures: Vec::new(),
        }
    }

    /// Small dense identifier, unique among live states of the same pool.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id.get()
    }

    /// The program, if one is set and still alive.
    pub fn program(&self) -> Option<Rc<Program>> {
        self.program.as_ref().and_then(Weak::upgrade)
    }

    /// Switches to `program`, discarding every stored value.
    ///
    /// The new buffers are zeroed and sized for the program's non-shared
    /// uniforms and samplers. `None` leaves an empty state that refuses to apply.
    pub fn set_program(&mut self, program: Option<&Rc<Program>>) {
        self.floats.clear();
        self.textures.clear();
        self.program = program.map(Rc::downgrade);

        if let Some(program) = program {
            self.floats.resize(program.local_float_count(), 0.0);
            self.textures.resize(program.local_sampler_count(), None);
        }
    }

    /// The packed float buffer.
    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.floats
    }

    /// Whether the program has a non-shared uniform called `name`.
    pub fn has_uniform_state(&self, name: &str) -> bool {
        self.program()
            .and_then(|p| p.find_uniform(name).map(|u| !u.is_shared()))
            .unwrap_or(false)
    }

    pub fn has_sampler_state(&self, name: &str) -> bool {
        self.program()
            .and_then(|p| p.find_sampler(name).map(|s| !s.is_shared()))
            .unwrap_or(false)
    }

    // ── index resolution ──────────────────────────────────────────────────

    /// Resolves `name` once so per-draw updates skip the name lookup.
    ///
    /// Returns [`UniformStateIndex::INVALID`] if there is no such non-shared
    /// uniform or no program.
    pub fn uniform_state_index(&self, name: &str) -> UniformStateIndex {
        let Some(program) = self.require_program("resolve uniform indices") else {
            return UniformStateIndex::INVALID;
        };
        match find_local_uniform(&program, name) {
            Some((index, offset)) => UniformStateIndex::new(index, offset),
            None => UniformStateIndex::INVALID,
        }
    }

    pub fn sampler_state_index(&self, name: &str) -> SamplerStateIndex {
        let Some(program) = self.require_program("resolve sampler indices") else {
            return SamplerStateIndex::INVALID;
        };
        match find_local_sampler(&program, name) {
            Some((index, slot)) => SamplerStateIndex::new(index, slot),
            None => SamplerStateIndex::INVALID,
        }
    }

    // ── raw uniform data ──────────────────────────────────────────────────

    /// Buffer region of uniform `name`, if it exists and is declared as `ty`.
    ///
    /// The region covers every array element.
    pub fn data(&self, name: &str, ty: UniformType) -> Option<&[f32]> {
        let range = self.named_range(name, ty)?;
        self.floats.get(range)
    }

    pub fn data_mut(&mut self, name: &str, ty: UniformType) -> Option<&mut [f32]> {
        let range = self.named_range(name, ty)?;
        self.floats.get_mut(range)
    }

    pub fn data_at(&self, index: UniformStateIndex, ty: UniformType) -> Option<&[f32]> {
        let range = self.indexed_range(index, ty)?;
        self.floats.get(range)
    }

    pub fn data_at_mut(&mut self, index: UniformStateIndex, ty: UniformType) -> Option<&mut [f32]> {
        let range = self.indexed_range(index, ty)?;
        self.floats.get_mut(range)
    }

    // ── typed uniform access ──────────────────────────────────────────────

    /// Reads the first element of uniform `name` as `T`.
    pub fn uniform_state<T: UniformData>(&self, name: &str) -> Option<T> {
        self.data(name, T::TYPE).and_then(T::read_from)
    }

    pub fn uniform_state_at<T: UniformData>(&self, index: UniformStateIndex) -> Option<T> {
        self.data_at(index, T::TYPE).and_then(T::read_from)
    }

    /// Writes `value` into the first element of uniform `name`.
    pub fn set_uniform_state<T: UniformData>(&mut self, name: &str, value: T) -> bool {
        self.data_mut(name, T::TYPE)
            .is_some_and(|dst| value.write_to(dst))
    }

    pub fn set_uniform_state_at<T: UniformData>(
        &mut self,
        index: UniformStateIndex,
        value: T,
    ) -> bool {
        self.data_at_mut(index, T::TYPE)
            .is_some_and(|dst| value.write_to(dst))
    }

    /// Writes a dynamically typed value into the first element of uniform `name`.
    pub fn set_uniform_value(&mut self, name: &str, value: UniformValue) -> bool {
        let src = value.as_floats();
        match self.data_mut(name, value.ty()) {
            Some(dst) if dst.len() >= src.len() => {
                dst[..src.len()].copy_from_slice(src);
                true
            }
            _ => false,
        }
    }

    // ── samplers ──────────────────────────────────────────────────────────

    /// Texture stored for sampler `name`, if set and still alive.
    pub fn sampler_state(&self, name: &str) -> Option<Rc<Texture>> {
        let program = self.require_program("read sampler state")?;
        let Some((_, slot)) = find_local_sampler(&program, name) else {
            log::error!(
                "program '{}' has no sampler named '{name}'",
                program.name()
            );
            return None;
        };
        self.texture_in_slot(slot)
    }

    pub fn sampler_state_at(&self, index: SamplerStateIndex) -> Option<Rc<Texture>> {
        let program = self.require_program("read sampler state")?;
        let (_, slot) = checked_sampler_index(&program, index)?;
        self.texture_in_slot(slot)
    }

    /// Stores `texture` for sampler `name`; `None` clears the slot.
    ///
    /// A texture whose kind the sampler cannot sample is rejected and the
    /// previous texture kept.
    pub fn set_sampler_state(&mut self, name: &str, texture: Option<&Rc<Texture>>) -> bool {
        let Some(program) = self.require_program("set sampler state") else {
            return false;
        };
        let Some((index, slot)) = find_local_sampler(&program, name) else {
            log::error!(
                "program '{}' has no sampler named '{name}'",
                program.name()
            );
            return false;
        };
        self.store_texture(&program, index, slot, texture)
    }

    pub fn set_sampler_state_at(
        &mut self,
        index: SamplerStateIndex,
        texture: Option<&Rc<Texture>>,
    ) -> bool {
        let Some(program) = self.require_program("set sampler state") else {
            return false;
        };
        let Some((i, slot)) = checked_sampler_index(&program, index) else {
            return false;
        };
        self.store_texture(&program, i, slot, texture)
    }

    // ── apply ─────────────────────────────────────────────────────────────

    /// Makes the program current and pushes every sampler and uniform.
    ///
    /// Sampler `i` of the program uses texture unit `i`. Shared slots are
    /// delegated to the tracker's shared state. Problems are logged and counted
    /// as configuration errors without stopping the remaining uploads; the
    /// return value is `false` if any occurred.
    pub fn apply(&self, tracker: &mut GraphicsStateTracker, gl: &mut dyn GraphicsContext) -> bool {
        let Some(weak) = self.program.as_ref() else {
            log::error!("applying program state with no program set");
            tracker.record_config_error();
            return false;
        };
        let Some(program) = weak.upgrade() else {
            log::error!("applying program state whose program was dropped");
            tracker.record_config_error();
            return false;
        };

        tracker.use_program(gl, &program);

        let shared = tracker.shared_state().cloned();
        let max_units = tracker.texture_units().max_units();
        let mut ok = true;
        let mut slot = 0;

        for (unit, sampler) in program.samplers().iter().enumerate() {
            let unit = unit as u32;
            let local_slot = (!sampler.is_shared()).then(|| {
                slot += 1;
                slot - 1
            });

            if unit >= max_units {
                log::error!(
                    "program '{}' sampler '{}' needs texture unit {unit} of {max_units}",
                    program.name(),
                    sampler.name()
                );
                tracker.record_config_error();
                ok = false;
                continue;
            }

            match (local_slot, &shared) {
                (Some(slot), _) => {
                    let stored = self.textures.get(slot).and_then(Option::as_ref);
                    let texture = stored.and_then(Weak::upgrade);
                    if stored.is_some() && texture.is_none() {
                        log::error!(
                            "texture for sampler '{}' of program '{}' was dropped",
                            sampler.name(),
                            program.name()
                        );
                        tracker.record_config_error();
                        ok = false;
                    }
                    tracker.units_mut().bind(
                        gl,
                        unit,
                        sampler.ty().texture_type(),
                        texture.as_deref(),
                    );
                }
                (None, Some(shared)) => {
                    if !shared.update_sampler(tracker.units_mut(), gl, sampler, unit) {
                        log::error!(
                            "shared program state has no texture for sampler '{}' of program '{}'",
                            sampler.name(),
                            program.name()
                        );
                        tracker.record_config_error();
                        ok = false;
                    }
                }
                (None, None) => {
                    log::error!(
                        "program '{}' uses shared sampler '{}' with no shared program state",
                        program.name(),
                        sampler.name()
                    );
                    tracker.record_config_error();
                    ok = false;
                }
            }

            gl.set_sampler_unit(sampler, unit);
        }

        let mut offset = 0;

        for uniform in program.uniforms() {
            if !uniform.is_shared() {
                let n = uniform.element_count();
                if let Some(values) = self.floats.get(offset..offset + n) {
                    gl.upload_uniform(uniform, values);
                }
                offset += n;
                continue;
            }

            match &shared {
                Some(shared) => {
                    if !shared.update_uniform(gl, uniform) {
                        log::error!(
                            "shared program state has no value for uniform '{}' of program '{}'",
                            uniform.name(),
                            program.name()
                        );
                        tracker.record_config_error();
                        ok = false;
                    }
                }
                None => {
                    log::error!(
                        "program '{}' uses shared uniform '{}' with no shared program state",
                        program.name(),
                        uniform.name()
                    );
                    tracker.record_config_error();
                    ok = false;
                }
            }
        }

        ok
    }

    // ── helpers ───────────────────────────────────────────────────────────

    fn require_program(&self, action: &str) -> Option<Rc<Program>> {
        match &self.program {
            None => {
                log::error!("cannot {action} on program state with no program");
                None
            }
            Some(weak) => {
                let program = weak.upgrade();
                if program.is_none() {
                    log::error!("cannot {action}: the program was dropped");
                }
                program
            }
        }
    }

    fn named_range(&self, name: &str, ty: UniformType) -> Option<std::ops::Range<usize>> {
        let program = self.require_program("access uniform state")?;
        let Some((index, offset)) = find_local_uniform(&program, name) else {
            log::error!(
                "program '{}' has no uniform named '{name}'",
                program.name()
            );
            return None;
        };
        let uniform = program.uniform(index)?;
        if uniform.ty() != ty {
            log::error!(
                "uniform '{name}' of program '{}' is not of type '{}'",
                program.name(),
                ty.name()
            );
            return None;
        }
        Some(offset..offset + uniform.element_count())
    }

    fn indexed_range(
        &self,
        index: UniformStateIndex,
        ty: UniformType,
    ) -> Option<std::ops::Range<usize>> {
        let program = self.require_program("access uniform state")?;
        let (Some(i), Some(offset)) = (index.index(), index.offset()) else {
            log::error!(
                "invalid uniform state index used on program '{}'",
                program.name()
            );
            return None;
        };
        let uniform = program.uniform(i);
        let Some(uniform) = uniform.filter(|_| program.local_uniform_offset(i) == Some(offset))
        else {
            log::error!(
                "uniform state index ({i}, {offset}) does not match program '{}'",
                program.name()
            );
            return None;
        };
        if uniform.ty() != ty {
            log::error!(
                "uniform {i} of program '{}' is not of type '{}'",
                program.name(),
                ty.name()
            );
            return None;
        }
        Some(offset..offset + uniform.element_count())
    }

    fn texture_in_slot(&self, slot: usize) -> Option<Rc<Texture>> {
        self.textures.get(slot)?.as_ref()?.upgrade()
    }

    fn store_texture(
        &mut self,
        program: &Program,
        index: usize,
        slot: usize,
        texture: Option<&Rc<Texture>>,
    ) -> bool {
        let Some(sampler) = program.sampler(index) else {
            return false;
        };
        if let Some(texture) = texture
            && !sampler.ty().accepts(texture.kind())
        {
            log::error!(
                "type mismatch between sampler '{}' and texture '{}'",
                sampler.name(),
                texture.name()
            );
            return false;
        }
        let Some(entry) = self.textures.get_mut(slot) else {
            return false;
        };
        *entry = texture.map(Rc::downgrade);
        true
    }
}

impl Clone for ProgramState {
    /// Copies program and values; the copy gets its own ID.
    fn clone(&self) -> Self {
        Self {
            id: self.id.pool().allocate(),
            program: self.program.clone(),
            floats: self.floats.clone(),
            textures: self.textures.clone(),
        }
    }
}

/// Ordinal and buffer offset of non-shared uniform `name`.
fn find_local_uniform(program: &Program, name: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for (index, uniform) in program.uniforms().iter().enumerate() {
        if uniform.is_shared() {
            continue;
        }
        if uniform.name() == name {
            return Some((index, offset));
        }
        offset += uniform.element_count();
    }
    None
}

/// Ordinal and slot of `index` if it matches the layout of `program`.
///
/// Catches indices resolved against a different program.
fn checked_sampler_index(program: &Program, index: SamplerStateIndex) -> Option<(usize, usize)> {
    let (Some(i), Some(slot)) = (index.index(), index.slot()) else {
        log::error!(
            "invalid sampler state index used on program '{}'",
            program.name()
        );
        return None;
    };
    if program.local_sampler_slot(i) != Some(slot) {
        log::error!(
            "sampler state index ({i}, {slot}) does not match program '{}'",
            program.name()
        );
        return None;
    }
    Some((i, slot))
}

/// Ordinal and texture slot of non-shared sampler `name`.
fn find_local_sampler(program: &Program, name: &str) -> Option<(usize, usize)> {
    program
        .samplers()
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_shared())
        .enumerate()
        .find(|(_, (_, s))| s.name() == name)
        .map(|(slot, (index, _))| (index, slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlCall, RecordingContext};
    use crate::program::{
        ProgramHandle, Sampler, SamplerType, TextureHandle, TextureType, Uniform, UniformLocation,
    };
    use crate::state::SharedUniformRegistry;

    fn sprite_program() -> Rc<Program> {
        Rc::new(Program::new(
            "sprite",
            ProgramHandle(1),
            vec![
                Uniform::new("color", UniformType::Vec4, UniformLocation(0)),
                Uniform::new("viewProj", UniformType::Mat4, UniformLocation(1)).with_shared(true),
                Uniform::new("scale", UniformType::Float, UniformLocation(2)),
            ],
            Vec::new(),
        ))
    }

    fn textured_program() -> Rc<Program> {
        Rc::new(Program::new(
            "textured",
            ProgramHandle(2),
            vec![Uniform::new("offsets", UniformType::Vec2, UniformLocation(0)).with_count(2)],
            vec![
                Sampler::new("shadowMap", SamplerType::Sampler2D, UniformLocation(3))
                    .with_shared(true),
                Sampler::new("image", SamplerType::Sampler2D, UniformLocation(4)),
                Sampler::new("sky", SamplerType::SamplerCube, UniformLocation(5)),
            ],
        ))
    }

    fn texture(kind: TextureType, handle: u32) -> Rc<Texture> {
        Rc::new(Texture::new(format!("tex{handle}"), kind, TextureHandle(handle)))
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn buffer_covers_only_local_uniforms() {
        let program = sprite_program();
        let mut state = ProgramState::new(&StateIdPool::new());
        state.set_program(Some(&program));

        assert_eq!(state.values(), &[0.0; 5]);
        let scale = state.uniform_state_index("scale");
        assert_eq!(scale.offset(), Some(4));
        assert_eq!(scale.index(), Some(2));
        assert!(!state.uniform_state_index("viewProj").is_valid());
        assert!(!state.uniform_state_index("missing").is_valid());
    }

    #[test]
    fn changing_program_zeroes_values() {
        let program = sprite_program();
        let mut state = ProgramState::new(&StateIdPool::new());
        state.set_program(Some(&program));
        assert!(state.set_uniform_state("scale", 3.0f32));

        state.set_program(Some(&program));
        assert_eq!(state.uniform_state::<f32>("scale"), Some(0.0));

        let program = textured_program();
        state.set_program(Some(&program));
        assert_eq!(state.values().len(), 4);
    }

    #[test]
    fn clearing_program_yields_sentinels() {
        let mut state = ProgramState::new(&StateIdPool::new());
        let program = sprite_program();
        state.set_program(Some(&program));
        state.set_program(None);

        assert!(state.values().is_empty());
        assert_eq!(state.uniform_state_index("color"), UniformStateIndex::INVALID);
        assert_eq!(state.sampler_state_index("image"), SamplerStateIndex::INVALID);
        assert!(!state.has_uniform_state("color"));
    }

    #[test]
    fn sampler_indices_skip_shared_samplers() {
        let mut state = ProgramState::new(&StateIdPool::new());
        let program = textured_program();
        state.set_program(Some(&program));

        let sky = state.sampler_state_index("sky");
        assert_eq!(sky.index(), Some(2));
        assert_eq!(sky.slot(), Some(1));
        assert!(!state.sampler_state_index("shadowMap").is_valid());
        assert!(state.has_sampler_state("image"));
        assert!(!state.has_sampler_state("shadowMap"));
    }

    // ── uniform values ────────────────────────────────────────────────────

    #[test]
    fn typed_access_by_name_and_index() {
        let mut state = ProgramState::new(&StateIdPool::new());
        let program = sprite_program();
        state.set_program(Some(&program));

        assert!(state.set_uniform_state("color", [1.0f32, 0.5, 0.25, 1.0]));
        let scale = state.uniform_state_index("scale");
        assert!(state.set_uniform_state_at(scale, 2.0f32));

        assert_eq!(state.values(), &[1.0, 0.5, 0.25, 1.0, 2.0]);
        assert_eq!(state.uniform_state_at::<f32>(scale), Some(2.0));
    }

    #[test]
    fn type_mismatch_leaves_values_untouched() {
        let mut state = ProgramState::new(&StateIdPool::new());
        let program = sprite_program();
        state.set_program(Some(&program));

        assert!(!state.set_uniform_state("color", 1.0f32));
        assert!(!state.set_uniform_state("viewProj", [[0.0f32; 4]; 4]));
        assert!(!state.set_uniform_value("scale", UniformValue::Vec2([1.0, 2.0])));
        assert_eq!(state.values(), &[0.0; 5]);
        assert_eq!(state.uniform_state::<[f32; 3]>("color"), None);
    }

    #[test]
    fn dynamic_value_writes_first_element() {
        let mut state = ProgramState::new(&StateIdPool::new());
        let program = textured_program();
        state.set_program(Some(&program));

        assert!(state.set_uniform_value("offsets", UniformValue::Vec2([3.0, 4.0])));
        assert_eq!(state.data("offsets", UniformType::Vec2), Some(&[3.0, 4.0, 0.0, 0.0][..]));
    }

    #[test]
    fn invalid_index_is_rejected() {
        let mut state = ProgramState::new(&StateIdPool::new());
        let program = sprite_program();
        state.set_program(Some(&program));
        assert!(!state.set_uniform_state_at(UniformStateIndex::INVALID, 1.0f32));
    }

    #[test]
    fn index_from_another_program_is_rejected() {
        let mut state = ProgramState::new(&StateIdPool::new());
        let sprite = sprite_program();
        state.set_program(Some(&sprite));
        let scale = state.uniform_state_index("scale");

        // Same ordinal and type for "gain", but it starts at float 1, not 4.
        let other = Rc::new(Program::new(
            "other",
            ProgramHandle(7),
            vec![
                Uniform::new("pad", UniformType::Float, UniformLocation(0)),
                Uniform::new("viewProj", UniformType::Mat4, UniformLocation(1)).with_shared(true),
                Uniform::new("gain", UniformType::Float, UniformLocation(2)),
                Uniform::new("tail", UniformType::Vec4, UniformLocation(3)),
            ],
            Vec::new(),
        ));
        state.set_program(Some(&other));

        assert!(!state.set_uniform_state_at(scale, 9.0f32));
        assert_eq!(state.uniform_state_at::<f32>(scale), None);
        assert_eq!(state.values(), &[0.0; 6]);

        let gain = state.uniform_state_index("gain");
        assert_eq!(gain.offset(), Some(1));
        assert!(state.set_uniform_state_at(gain, 9.0f32));
        assert_eq!(state.values(), &[0.0, 9.0, 0.0, 0.0, 0.0, 0.0]);
    }

    // ── sampler values ────────────────────────────────────────────────────

    #[test]
    fn sampler_kind_is_checked() {
        let mut state = ProgramState::new(&StateIdPool::new());
        let program = textured_program();
        state.set_program(Some(&program));
        let flat = texture(TextureType::Texture2D, 10);
        let cube = texture(TextureType::TextureCube, 11);

        assert!(state.set_sampler_state("image", Some(&flat)));
        assert!(!state.set_sampler_state("image", Some(&cube)));
        assert_eq!(state.sampler_state("image").map(|t| t.handle()), Some(TextureHandle(10)));

        let sky = state.sampler_state_index("sky");
        assert!(state.set_sampler_state_at(sky, Some(&cube)));
        assert_eq!(state.sampler_state_at(sky).map(|t| t.handle()), Some(TextureHandle(11)));

        assert!(state.set_sampler_state("image", None));
        assert!(state.sampler_state("image").is_none());
    }

    #[test]
    fn states_do_not_keep_textures_alive() {
        let mut state = ProgramState::new(&StateIdPool::new());
        let program = textured_program();
        state.set_program(Some(&program));
        let flat = texture(TextureType::Texture2D, 10);
        state.set_sampler_state("image", Some(&flat));

        drop(flat);

        assert!(state.sampler_state("image").is_none());
    }

    #[test]
    fn sampler_index_from_another_program_is_rejected() {
        let mut state = ProgramState::new(&StateIdPool::new());
        let textured = textured_program();
        state.set_program(Some(&textured));
        let sky = state.sampler_state_index("sky");
        assert_eq!((sky.index(), sky.slot()), (Some(2), Some(1)));

        // Ordinal 2 is still a cube sampler here, but its slot is 2.
        let other = Rc::new(Program::new(
            "other",
            ProgramHandle(8),
            Vec::new(),
            vec![
                Sampler::new("image", SamplerType::Sampler2D, UniformLocation(0)),
                Sampler::new("reflection", SamplerType::SamplerCube, UniformLocation(1)),
                Sampler::new("sky", SamplerType::SamplerCube, UniformLocation(2)),
            ],
        ));
        state.set_program(Some(&other));
        let cube = texture(TextureType::TextureCube, 12);

        assert!(!state.set_sampler_state_at(sky, Some(&cube)));
        assert!(state.sampler_state("reflection").is_none());
        assert!(state.sampler_state("sky").is_none());

        assert!(state.set_sampler_state("reflection", Some(&cube)));
        assert!(state.sampler_state_at(sky).is_none());
    }

    // ── identity ──────────────────────────────────────────────────────────

    #[test]
    fn clone_copies_values_with_fresh_id() {
        let pool = StateIdPool::new();
        let mut state = ProgramState::new(&pool);
        let program = sprite_program();
        state.set_program(Some(&program));
        state.set_uniform_state("scale", 5.0f32);

        let copy = state.clone();

        assert_ne!(copy.id(), state.id());
        assert_eq!(copy.values(), state.values());
        assert_eq!(pool.live_count(), 2);
    }

    // ── apply ─────────────────────────────────────────────────────────────

    #[test]
    fn apply_without_shared_state_reports_shared_uniform_and_uploads_rest() {
        let mut tracker = GraphicsStateTracker::default();
        let mut gl = RecordingContext::new();
        let mut state = tracker.new_program_state();
        let program = sprite_program();
        state.set_program(Some(&program));
        state.set_uniform_state("color", [1.0f32, 0.0, 0.0, 1.0]);
        state.set_uniform_state("scale", 2.0f32);

        assert!(!state.apply(&mut tracker, &mut gl));

        assert_eq!(tracker.stats().config_errors, 1);
        assert_eq!(
            gl.calls(),
            &[
                GlCall::UseProgram(ProgramHandle(1)),
                GlCall::UploadUniform {
                    uniform: "color".into(),
                    values: vec![1.0, 0.0, 0.0, 1.0]
                },
                GlCall::UploadUniform {
                    uniform: "scale".into(),
                    values: vec![2.0]
                },
            ]
        );
    }

    #[test]
    fn apply_delegates_shared_uniforms() {
        let registry = Rc::new(SharedUniformRegistry::new());
        registry.declare_uniform("viewProj", UniformType::Mat4);
        let mut tracker = GraphicsStateTracker::default();
        tracker.set_shared_state(Some(registry.clone()));
        let mut gl = RecordingContext::new();
        let mut state = tracker.new_program_state();
        let program = sprite_program();
        state.set_program(Some(&program));

        assert!(state.apply(&mut tracker, &mut gl));

        assert_eq!(tracker.stats().config_errors, 0);
        assert!(gl.calls().contains(&GlCall::UploadUniform {
            uniform: "viewProj".into(),
            values: vec![0.0; 16]
        }));
    }

    #[test]
    fn apply_binds_samplers_to_their_ordinal_units() {
        let registry = Rc::new(SharedUniformRegistry::new());
        registry.declare_sampler("shadowMap", SamplerType::Sampler2D);
        let shadow = texture(TextureType::Texture2D, 20);
        registry.set_sampler("shadowMap", Some(&shadow));

        let mut tracker = GraphicsStateTracker::default();
        tracker.set_shared_state(Some(registry.clone()));
        let mut gl = RecordingContext::new();
        let mut state = tracker.new_program_state();
        let program = textured_program();
        state.set_program(Some(&program));
        let image = texture(TextureType::Texture2D, 21);
        state.set_sampler_state("image", Some(&image));

        assert!(state.apply(&mut tracker, &mut gl));

        let calls = gl.take_calls();
        assert_eq!(
            &calls[..7],
            &[
                GlCall::UseProgram(ProgramHandle(2)),
                GlCall::ActiveTexture(0),
                GlCall::BindTexture(TextureType::Texture2D, Some(TextureHandle(20))),
                GlCall::SetSamplerUnit { sampler: "shadowMap".into(), unit: 0 },
                GlCall::ActiveTexture(1),
                GlCall::BindTexture(TextureType::Texture2D, Some(TextureHandle(21))),
                GlCall::SetSamplerUnit { sampler: "image".into(), unit: 1 },
            ]
        );
        // Unit 2 holds nothing yet, so the empty sky slot needs no bind.
        assert_eq!(
            &calls[7..],
            &[
                GlCall::SetSamplerUnit { sampler: "sky".into(), unit: 2 },
                GlCall::UploadUniform { uniform: "offsets".into(), values: vec![0.0; 4] },
            ]
        );
        assert_eq!(tracker.texture_units().bound(1), Some(TextureHandle(21)));
    }

    #[test]
    fn reapply_skips_bound_program_and_textures() {
        let mut tracker = GraphicsStateTracker::default();
        tracker.set_shared_state(Some(Rc::new(SharedUniformRegistry::new())));
        let mut gl = RecordingContext::new();
        let program = Rc::new(Program::new(
            "p",
            ProgramHandle(5),
            Vec::new(),
            vec![Sampler::new("image", SamplerType::Sampler2D, UniformLocation(0))],
        ));
        let mut state = tracker.new_program_state();
        state.set_program(Some(&program));
        let image = texture(TextureType::Texture2D, 3);
        state.set_sampler_state("image", Some(&image));

        state.apply(&mut tracker, &mut gl);
        gl.clear();
        state.apply(&mut tracker, &mut gl);

        assert_eq!(
            gl.calls(),
            &[GlCall::SetSamplerUnit { sampler: "image".into(), unit: 0 }]
        );
    }

    #[test]
    fn apply_without_program_is_a_counted_no_op() {
        let mut tracker = GraphicsStateTracker::default();
        let mut gl = RecordingContext::new();
        let state = tracker.new_program_state();

        assert!(!state.apply(&mut tracker, &mut gl));
        assert!(gl.calls().is_empty());
        assert_eq!(tracker.stats().config_errors, 1);
    }

    #[test]
    fn dropped_program_is_reported() {
        let mut tracker = GraphicsStateTracker::default();
        let mut gl = RecordingContext::new();
        let mut state = tracker.new_program_state();
        let program = sprite_program();
        state.set_program(Some(&program));
        drop(program);

        assert!(state.program().is_none());
        assert!(!state.apply(&mut tracker, &mut gl));
        assert_eq!(tracker.stats().config_errors, 1);
    }

    #[test]
    fn samplers_past_unit_limit_are_reported() {
        let mut tracker = GraphicsStateTracker::new(crate::state::TrackerConfig {
            max_texture_units: 1,
            ..Default::default()
        });
        let mut gl = RecordingContext::new();
        let program = Rc::new(Program::new(
            "p",
            ProgramHandle(6),
            Vec::new(),
            vec![
                Sampler::new("a", SamplerType::Sampler2D, UniformLocation(0)),
                Sampler::new("b", SamplerType::Sampler2D, UniformLocation(1)),
            ],
        ));
        let mut state = tracker.new_program_state();
        state.set_program(Some(&program));

        assert!(!state.apply(&mut tracker, &mut gl));
        assert_eq!(tracker.stats().config_errors, 1);
    }

    #[test]
    fn dropped_texture_is_reported_and_unbound() {
        let mut tracker = GraphicsStateTracker::default();
        tracker.set_shared_state(Some(Rc::new(SharedUniformRegistry::new())));
        let mut gl = RecordingContext::new();
        let program = Rc::new(Program::new(
            "p",
            ProgramHandle(5),
            vec![Uniform::new("scale", UniformType::Float, UniformLocation(1))],
            vec![Sampler::new("image", SamplerType::Sampler2D, UniformLocation(0))],
        ));
        let mut state = tracker.new_program_state();
        state.set_program(Some(&program));
        state.set_uniform_state("scale", 4.0f32);
        let image = texture(TextureType::Texture2D, 3);
        state.set_sampler_state("image", Some(&image));
        assert!(state.apply(&mut tracker, &mut gl));

        drop(image);
        gl.clear();

        assert!(!state.apply(&mut tracker, &mut gl));
        assert_eq!(tracker.stats().config_errors, 1);
        assert_eq!(tracker.texture_units().bound(0), None);
        assert_eq!(
            gl.calls(),
            &[
                GlCall::BindTexture(TextureType::Texture2D, None),
                GlCall::SetSamplerUnit { sampler: "image".into(), unit: 0 },
                GlCall::UploadUniform { uniform: "scale".into(), values: vec![4.0] },
            ]
        );
    }

    #[test]
    fn undeclared_shared_sampler_is_reported_and_uploads_rest() {
        let mut tracker = GraphicsStateTracker::default();
        tracker.set_shared_state(Some(Rc::new(SharedUniformRegistry::new())));
        let mut gl = RecordingContext::new();
        let mut state = tracker.new_program_state();
        let program = textured_program();
        state.set_program(Some(&program));
        let image = texture(TextureType::Texture2D, 21);
        state.set_sampler_state("image", Some(&image));

        assert!(!state.apply(&mut tracker, &mut gl));

        assert_eq!(tracker.stats().config_errors, 1);
        assert_eq!(tracker.texture_units().bound(0), None);
        assert_eq!(tracker.texture_units().bound(1), Some(TextureHandle(21)));
        let calls = gl.calls();
        assert!(calls.contains(&GlCall::SetSamplerUnit { sampler: "shadowMap".into(), unit: 0 }));
        assert!(calls.contains(&GlCall::UploadUniform {
            uniform: "offsets".into(),
            values: vec![0.0; 4]
        }));
    }

    #[test]
    fn undeclared_shared_uniform_is_reported_and_uploads_rest() {
        let registry = Rc::new(SharedUniformRegistry::new());
        registry.declare_uniform("time", UniformType::Float);
        let mut tracker = GraphicsStateTracker::default();
        tracker.set_shared_state(Some(registry.clone()));
        let mut gl = RecordingContext::new();
        let mut state = tracker.new_program_state();
        let program = sprite_program();
        state.set_program(Some(&program));
        state.set_uniform_state("scale", 2.0f32);

        assert!(!state.apply(&mut tracker, &mut gl));

        assert_eq!(tracker.stats().config_errors, 1);
        assert_eq!(
            gl.calls(),
            &[
                GlCall::UseProgram(ProgramHandle(1)),
                GlCall::UploadUniform { uniform: "color".into(), values: vec![0.0; 4] },
                GlCall::UploadUniform { uniform: "scale".into(), values: vec![2.0] },
            ]
        );
    }
}
