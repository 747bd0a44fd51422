use super::uniform::{Sampler, Uniform};

/// Driver-side program object name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramHandle(pub u32);

/// A linked shader program and its active uniforms/samplers.
///
/// Uniforms and samplers are kept in the driver's enumeration order; every
/// per-instance value buffer derives its layout from that order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    name: String,
    handle: ProgramHandle,
    uniforms: Vec<Uniform>,
    samplers: Vec<Sampler>,
}

impl Program {
    pub fn new(
        name: impl Into<String>,
        handle: ProgramHandle,
        uniforms: Vec<Uniform>,
        samplers: Vec<Sampler>,
    ) -> Self {
        Self {
            name: name.into(),
            handle,
            uniforms,
            samplers,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    #[inline]
    pub fn uniforms(&self) -> &[Uniform] {
        &self.uniforms
    }

    #[inline]
    pub fn samplers(&self) -> &[Sampler] {
        &self.samplers
    }

    #[inline]
    pub fn uniform(&self, index: usize) -> Option<&Uniform> {
        self.uniforms.get(index)
    }

    #[inline]
    pub fn sampler(&self, index: usize) -> Option<&Sampler> {
        self.samplers.get(index)
    }

    pub fn find_uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.iter().find(|u| u.name() == name)
    }

    pub fn find_sampler(&self, name: &str) -> Option<&Sampler> {
        self.samplers.iter().find(|s| s.name() == name)
    }

    /// Total floats needed to store every non-shared uniform.
    pub fn local_float_count(&self) -> usize {
        self.uniforms
            .iter()
            .filter(|u| !u.is_shared())
            .map(Uniform::element_count)
            .sum()
    }

    /// Number of samplers whose textures are stored per instance.
    pub fn local_sampler_count(&self) -> usize {
        self.samplers.iter().filter(|s| !s.is_shared()).count()
    }

    /// Float offset of uniform `index` in a per-instance value buffer.
    ///
    /// `None` if the uniform does not exist or is shared.
    pub fn local_uniform_offset(&self, index: usize) -> Option<usize> {
        let uniform = self.uniforms.get(index)?;
        if uniform.is_shared() {
            return None;
        }
        Some(
            self.uniforms[..index]
                .iter()
                .filter(|u| !u.is_shared())
                .map(Uniform::element_count)
                .sum(),
        )
    }

    /// Texture slot of sampler `index` in a per-instance texture list.
    ///
    /// `None` if the sampler does not exist or is shared.
    pub fn local_sampler_slot(&self, index: usize) -> Option<usize> {
        let sampler = self.samplers.get(index)?;
        if sampler.is_shared() {
            return None;
        }
        Some(self.samplers[..index].iter().filter(|s| !s.is_shared()).count())
    }
}
