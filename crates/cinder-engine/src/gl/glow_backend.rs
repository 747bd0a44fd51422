use std::num::NonZeroU32;

use anyhow::{Context, Result};
use glow::HasContext;

use crate::program::{
    Program, ProgramHandle, Sampler, SamplerType, Texture, TextureType, Uniform, UniformLocation,
    UniformType,
};
use crate::state::SharedProgramState;

use super::{
    BlendFactor, Capability, CullMode, Function, GlError, GraphicsContext, Operation, PolygonMode,
};

/// OpenGL backend over a loaded `glow` context.
pub struct GlowContext {
    gl: glow::Context,
}

impl GlowContext {
    /// Wraps a loaded `glow` context.
    ///
    /// # Safety
    /// The OpenGL context `gl` was loaded for must be current on the calling
    /// thread for as long as this value is used, and every handle passed to it
    /// (programs, textures, locations) must belong to that context.
    pub unsafe fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    /// Returns the wrapped context for calls outside the state core.
    pub fn raw(&self) -> &glow::Context {
        &self.gl
    }

    /// Compiles and links a program, then enumerates its active uniforms.
    ///
    /// Uniforms and samplers keep the driver's enumeration order. A slot is
    /// marked shared when `shared` declares the same name with the same type.
    /// Compile and link failures are logged with the driver's info log and
    /// returned as errors; warnings are logged only.
    pub fn link_program(
        &mut self,
        name: &str,
        vertex_src: &str,
        fragment_src: &str,
        shared: Option<&dyn SharedProgramState>,
    ) -> Result<Program> {
        // SAFETY: context is current per the `new` contract.
        let program = unsafe { self.gl.create_program() }
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("failed to create program object for `{name}`"))?;

        let stages = [
            (glow::VERTEX_SHADER, vertex_src, "vertex"),
            (glow::FRAGMENT_SHADER, fragment_src, "fragment"),
        ];

        let mut shaders = Vec::with_capacity(stages.len());
        for (shader_type, source, stage) in stages {
            match self.compile_shader(shader_type, source) {
                Ok(shader) => {
                    unsafe { self.gl.attach_shader(program, shader) };
                    shaders.push(shader);
                }
                Err(err) => {
                    unsafe {
                        for shader in shaders {
                            self.gl.delete_shader(shader);
                        }
                        self.gl.delete_program(program);
                    }
                    return Err(err).with_context(|| {
                        format!("failed to compile {stage} shader of program `{name}`")
                    });
                }
            }
        }

        let (linked, info_log) = unsafe {
            self.gl.link_program(program);
            let linked = self.gl.get_program_link_status(program);
            let info_log = self.gl.get_program_info_log(program);
            for shader in shaders {
                self.gl.detach_shader(program, shader);
                self.gl.delete_shader(shader);
            }
            (linked, info_log)
        };

        if !linked {
            log::error!("failed to link program `{name}`: {}", info_log.trim());
            unsafe { self.gl.delete_program(program) };
            anyhow::bail!("failed to link program `{name}`: {}", info_log.trim());
        }
        if !info_log.trim().is_empty() {
            log::warn!("warnings when linking program `{name}`: {}", info_log.trim());
        }

        let (uniforms, samplers) = self.enumerate_uniforms(program, name, shared);

        log::debug!(
            "linked program `{name}`: {} uniforms, {} samplers",
            uniforms.len(),
            samplers.len()
        );

        Ok(Program::new(
            name,
            ProgramHandle(program.0.get()),
            uniforms,
            samplers,
        ))
    }

    /// Deletes the driver object behind `program`.
    ///
    /// States still referring to it must not be applied afterwards.
    pub fn delete_program(&mut self, program: &Program) {
        if let Some(id) = NonZeroU32::new(program.handle().0) {
            unsafe { self.gl.delete_program(glow::NativeProgram(id)) };
        }
    }

    fn compile_shader(&self, shader_type: u32, source: &str) -> Result<glow::NativeShader> {
        unsafe {
            let shader = self
                .gl
                .create_shader(shader_type)
                .map_err(anyhow::Error::msg)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);

            let compiled = self.gl.get_shader_compile_status(shader);
            let info_log = self.gl.get_shader_info_log(shader);

            if !compiled {
                self.gl.delete_shader(shader);
                log::error!("failed to compile shader: {}", info_log.trim());
                anyhow::bail!("{}", info_log.trim());
            }
            if !info_log.trim().is_empty() {
                log::warn!("warnings when compiling shader: {}", info_log.trim());
            }

            Ok(shader)
        }
    }

    fn enumerate_uniforms(
        &self,
        program: glow::NativeProgram,
        name: &str,
        shared: Option<&dyn SharedProgramState>,
    ) -> (Vec<Uniform>, Vec<Sampler>) {
        let mut uniforms = Vec::new();
        let mut samplers = Vec::new();

        let count = unsafe { self.gl.get_active_uniforms(program) };

        for index in 0..count {
            let Some(active) = (unsafe { self.gl.get_active_uniform(program, index) }) else {
                log::warn!("no information available for uniform {index} of program `{name}`");
                continue;
            };

            if active.name.starts_with("gl_") {
                continue;
            }

            // Arrays are reported as `name[0]`.
            let base = active.name.strip_suffix("[0]").unwrap_or(&active.name);

            let Some(location) = (unsafe { self.gl.get_uniform_location(program, base) }) else {
                log::warn!("uniform `{base}` of program `{name}` has no location");
                continue;
            };
            let location = UniformLocation(location.0);

            if let Some(ty) = sampler_type_from_gl(active.utype) {
                let is_shared = shared.is_some_and(|s| s.declares_sampler(base, ty));
                samplers.push(Sampler::new(base, ty, location).with_shared(is_shared));
            } else if let Some(ty) = uniform_type_from_gl(active.utype) {
                let is_shared = shared.is_some_and(|s| s.declares_uniform(base, ty));
                uniforms.push(
                    Uniform::new(base, ty, location)
                        .with_count(active.size.max(1) as usize)
                        .with_shared(is_shared),
                );
            } else {
                log::warn!(
                    "uniform `{base}` of program `{name}` has unsupported type 0x{:04x}; ignored",
                    active.utype
                );
            }
        }

        (uniforms, samplers)
    }
}

impl GraphicsContext for GlowContext {
    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        let cap = capability_to_gl(capability);
        unsafe {
            if enabled {
                self.gl.enable(cap);
            } else {
                self.gl.disable(cap);
            }
        }
    }

    fn cull_face(&mut self, mode: CullMode) {
        let face = match mode {
            CullMode::Front => glow::FRONT,
            CullMode::Back => glow::BACK,
            CullMode::Both => glow::FRONT_AND_BACK,
            CullMode::None => return,
        };
        unsafe { self.gl.cull_face(face) };
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        unsafe { self.gl.blend_func(blend_factor_to_gl(src), blend_factor_to_gl(dst)) };
    }

    fn depth_mask(&mut self, enabled: bool) {
        unsafe { self.gl.depth_mask(enabled) };
    }

    fn depth_func(&mut self, function: Function) {
        unsafe { self.gl.depth_func(function_to_gl(function)) };
    }

    fn color_mask(&mut self, enabled: bool) {
        unsafe { self.gl.color_mask(enabled, enabled, enabled, enabled) };
    }

    fn stencil_func(&mut self, function: Function, reference: u32, mask: u32) {
        unsafe {
            self.gl
                .stencil_func(function_to_gl(function), reference as i32, mask)
        };
    }

    fn stencil_op(
        &mut self,
        stencil_fail: Operation,
        depth_fail: Operation,
        depth_pass: Operation,
    ) {
        unsafe {
            self.gl.stencil_op(
                operation_to_gl(stencil_fail),
                operation_to_gl(depth_fail),
                operation_to_gl(depth_pass),
            )
        };
    }

    fn polygon_mode(&mut self, mode: PolygonMode) {
        let mode = match mode {
            PolygonMode::Fill => glow::FILL,
            PolygonMode::Line => glow::LINE,
        };
        unsafe { self.gl.polygon_mode(glow::FRONT_AND_BACK, mode) };
    }

    fn line_width(&mut self, width: f32) {
        unsafe { self.gl.line_width(width) };
    }

    fn use_program(&mut self, program: &Program) {
        let native = NonZeroU32::new(program.handle().0).map(glow::NativeProgram);
        unsafe { self.gl.use_program(native) };
    }

    fn active_texture(&mut self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) };
    }

    fn bind_texture(&mut self, target: TextureType, texture: Option<&Texture>) {
        let native = texture
            .and_then(|t| NonZeroU32::new(t.handle().0))
            .map(glow::NativeTexture);
        unsafe { self.gl.bind_texture(texture_target_to_gl(target), native) };
    }

    fn set_sampler_unit(&mut self, sampler: &Sampler, unit: u32) {
        let location = glow::NativeUniformLocation(sampler.location().0);
        unsafe { self.gl.uniform_1_i32(Some(&location), unit as i32) };
    }

    fn upload_uniform(&mut self, uniform: &Uniform, values: &[f32]) {
        let location = glow::NativeUniformLocation(uniform.location().0);
        let location = Some(&location);
        unsafe {
            match uniform.ty() {
                UniformType::Float => self.gl.uniform_1_f32_slice(location, values),
                UniformType::Vec2 => self.gl.uniform_2_f32_slice(location, values),
                UniformType::Vec3 => self.gl.uniform_3_f32_slice(location, values),
                UniformType::Vec4 => self.gl.uniform_4_f32_slice(location, values),
                UniformType::Mat2 => self.gl.uniform_matrix_2_f32_slice(location, false, values),
                UniformType::Mat3 => self.gl.uniform_matrix_3_f32_slice(location, false, values),
                UniformType::Mat4 => self.gl.uniform_matrix_4_f32_slice(location, false, values),
            }
        }
    }

    fn take_error(&mut self) -> Option<GlError> {
        GlError::from_code(unsafe { self.gl.get_error() })
    }
}

fn capability_to_gl(capability: Capability) -> u32 {
    match capability {
        Capability::CullFace => glow::CULL_FACE,
        Capability::Blend => glow::BLEND,
        Capability::DepthTest => glow::DEPTH_TEST,
        Capability::StencilTest => glow::STENCIL_TEST,
        Capability::LineSmooth => glow::LINE_SMOOTH,
        Capability::Multisample => glow::MULTISAMPLE,
    }
}

fn blend_factor_to_gl(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcColor => glow::SRC_COLOR,
        BlendFactor::DstColor => glow::DST_COLOR,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::DstAlpha => glow::DST_ALPHA,
        BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
        BlendFactor::OneMinusDstColor => glow::ONE_MINUS_DST_COLOR,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
    }
}

fn function_to_gl(function: Function) -> u32 {
    match function {
        Function::Never => glow::NEVER,
        Function::Always => glow::ALWAYS,
        Function::Equal => glow::EQUAL,
        Function::NotEqual => glow::NOTEQUAL,
        Function::Less => glow::LESS,
        Function::LessEqual => glow::LEQUAL,
        Function::Greater => glow::GREATER,
        Function::GreaterEqual => glow::GEQUAL,
    }
}

fn operation_to_gl(operation: Operation) -> u32 {
    match operation {
        Operation::Keep => glow::KEEP,
        Operation::Zero => glow::ZERO,
        Operation::Replace => glow::REPLACE,
        Operation::Increase => glow::INCR,
        Operation::Decrease => glow::DECR,
        Operation::Invert => glow::INVERT,
        Operation::IncreaseWrap => glow::INCR_WRAP,
        Operation::DecreaseWrap => glow::DECR_WRAP,
    }
}

fn texture_target_to_gl(target: TextureType) -> u32 {
    match target {
        TextureType::Texture1D => glow::TEXTURE_1D,
        TextureType::Texture2D => glow::TEXTURE_2D,
        TextureType::Texture3D => glow::TEXTURE_3D,
        TextureType::TextureCube => glow::TEXTURE_CUBE_MAP,
    }
}

fn uniform_type_from_gl(ty: u32) -> Option<UniformType> {
    match ty {
        glow::FLOAT => Some(UniformType::Float),
        glow::FLOAT_VEC2 => Some(UniformType::Vec2),
        glow::FLOAT_VEC3 => Some(UniformType::Vec3),
        glow::FLOAT_VEC4 => Some(UniformType::Vec4),
        glow::FLOAT_MAT2 => Some(UniformType::Mat2),
        glow::FLOAT_MAT3 => Some(UniformType::Mat3),
        glow::FLOAT_MAT4 => Some(UniformType::Mat4),
        _ => None,
    }
}

fn sampler_type_from_gl(ty: u32) -> Option<SamplerType> {
    match ty {
        glow::SAMPLER_1D => Some(SamplerType::Sampler1D),
        glow::SAMPLER_2D => Some(SamplerType::Sampler2D),
        glow::SAMPLER_3D => Some(SamplerType::Sampler3D),
        glow::SAMPLER_CUBE => Some(SamplerType::SamplerCube),
        _ => None,
    }
}
