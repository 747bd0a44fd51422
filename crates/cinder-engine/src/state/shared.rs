use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::gl::GraphicsContext;
use crate::program::{Sampler, SamplerType, Texture, Uniform, UniformType, UniformValue};

use super::tracker::TextureUnits;

/// Values common to many programs (camera matrices, light lists, shadow maps).
///
/// Uniforms and samplers flagged shared at link time are not stored per
/// instance; `ProgramState::apply` asks the tracker's active shared state to
/// push them instead.
pub trait SharedProgramState {
    /// Whether a uniform with this name and type is provided here.
    ///
    /// Consulted at link time to set the shared flag.
    fn declares_uniform(&self, _name: &str, _ty: UniformType) -> bool {
        false
    }

    fn declares_sampler(&self, _name: &str, _ty: SamplerType) -> bool {
        false
    }

    /// Pushes the current value for `uniform` to the current program.
    ///
    /// Returns `false` if no matching value is known.
    fn update_uniform(&self, gl: &mut dyn GraphicsContext, uniform: &Uniform) -> bool;

    /// Binds the current texture for `sampler` on `unit`.
    ///
    /// The caller points the sampler uniform at `unit` afterwards.
    fn update_sampler(
        &self,
        units: &mut TextureUnits,
        gl: &mut dyn GraphicsContext,
        sampler: &Sampler,
        unit: u32,
    ) -> bool;
}

#[derive(Debug)]
struct SharedUniform {
    ty: UniformType,
    count: usize,
    values: Vec<f32>,
}

#[derive(Debug)]
struct SharedSampler {
    ty: SamplerType,
    texture: Option<Weak<Texture>>,
}

/// Name-keyed store of shared uniform values and sampler textures.
///
/// Values are zero until set. Interior mutability lets the registry be shared
/// through `Rc` with the tracker while game code keeps updating it.
#[derive(Debug, Default)]
pub struct SharedUniformRegistry {
    uniforms: RefCell<HashMap<String, SharedUniform>>,
    samplers: RefCell<HashMap<String, SharedSampler>>,
}

impl SharedUniformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a single-element shared uniform. Redeclaring resets its value.
    pub fn declare_uniform(&self, name: impl Into<String>, ty: UniformType) {
        self.declare_uniform_array(name, ty, 1);
    }

    /// Declares a shared uniform array of `count` elements (at least 1).
    pub fn declare_uniform_array(&self, name: impl Into<String>, ty: UniformType, count: usize) {
        let count = count.max(1);
        self.uniforms.borrow_mut().insert(
            name.into(),
            SharedUniform {
                ty,
                count,
                values: vec![0.0; ty.float_count() * count],
            },
        );
    }

    pub fn declare_sampler(&self, name: impl Into<String>, ty: SamplerType) {
        self.samplers
            .borrow_mut()
            .insert(name.into(), SharedSampler { ty, texture: None });
    }

    /// Sets the first element of a declared uniform.
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) -> bool {
        self.set_uniform_element(name, 0, value)
    }

    /// Sets element `element` of a declared uniform array.
    ///
    /// Fails (logged) if the name is undeclared, the type differs from the
    /// declaration, or the element is out of range.
    pub fn set_uniform_element(
        &self,
        name: &str,
        element: usize,
        value: impl Into<UniformValue>,
    ) -> bool {
        let value = value.into();
        let mut uniforms = self.uniforms.borrow_mut();
        let Some(slot) = uniforms.get_mut(name) else {
            log::error!("shared uniform '{name}' is not declared");
            return false;
        };
        if slot.ty != value.ty() {
            log::error!(
                "shared uniform '{name}' is declared as {} but was given {}",
                slot.ty.name(),
                value.ty().name()
            );
            return false;
        }
        if element >= slot.count {
            log::error!(
                "shared uniform '{name}' has {} elements, index {element} is out of range",
                slot.count
            );
            return false;
        }

        let n = slot.ty.float_count();
        slot.values[element * n..(element + 1) * n].copy_from_slice(value.as_floats());
        true
    }

    /// Current value of the first element of a declared uniform.
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        let uniforms = self.uniforms.borrow();
        let slot = uniforms.get(name)?;
        UniformValue::from_floats(slot.ty, &slot.values)
    }

    /// Sets (or clears, with `None`) the texture of a declared sampler.
    ///
    /// The texture kind must match the sampler type; on mismatch the previous
    /// texture is kept.
    pub fn set_sampler(&self, name: &str, texture: Option<&Rc<Texture>>) -> bool {
        let mut samplers = self.samplers.borrow_mut();
        let Some(slot) = samplers.get_mut(name) else {
            log::error!("shared sampler '{name}' is not declared");
            return false;
        };
        if let Some(texture) = texture
            && !slot.ty.accepts(texture.kind())
        {
            log::error!(
                "shared sampler '{name}' of type {} cannot sample texture '{}'",
                slot.ty.name(),
                texture.name()
            );
            return false;
        }

        slot.texture = texture.map(Rc::downgrade);
        true
    }

    pub fn sampler(&self, name: &str) -> Option<Rc<Texture>> {
        self.samplers
            .borrow()
            .get(name)?
            .texture
            .as_ref()
            .and_then(Weak::upgrade)
    }
}

impl SharedProgramState for SharedUniformRegistry {
    fn declares_uniform(&self, name: &str, ty: UniformType) -> bool {
        self.uniforms.borrow().get(name).is_some_and(|u| u.ty == ty)
    }

    fn declares_sampler(&self, name: &str, ty: SamplerType) -> bool {
        self.samplers.borrow().get(name).is_some_and(|s| s.ty == ty)
    }

    fn update_uniform(&self, gl: &mut dyn GraphicsContext, uniform: &Uniform) -> bool {
        let uniforms = self.uniforms.borrow();
        let Some(slot) = uniforms.get(uniform.name()) else {
            return false;
        };
        if slot.ty != uniform.ty() {
            return false;
        }

        let n = slot.values.len().min(uniform.element_count());
        gl.upload_uniform(uniform, &slot.values[..n]);
        true
    }

    fn update_sampler(
        &self,
        units: &mut TextureUnits,
        gl: &mut dyn GraphicsContext,
        sampler: &Sampler,
        unit: u32,
    ) -> bool {
        let samplers = self.samplers.borrow();
        let Some(slot) = samplers.get(sampler.name()) else {
            return false;
        };
        if slot.ty != sampler.ty() {
            return false;
        }

        let texture = slot.texture.as_ref().and_then(Weak::upgrade);
        units.bind(gl, unit, sampler.ty().texture_type(), texture.as_deref())
    }
}
