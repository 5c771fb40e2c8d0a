//! OpenGL shader programs.
//!
//! This module defines [`ShaderProgram`], which owns one GL program object through its whole
//! compile and link cycle, and the [`Uniform`] trait for setting uniform variables on it.
//!
//! All GPU calls go through the [`ProgramBackend`] trait. The production backend is
//! [`glow::Context`].

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use fxhash::FxHashMap;
use glam::{IVec2, IVec3, Mat3, Mat4, Vec2, Vec3, Vec4};
use glint_core::{ShaderStage, stage::UnknownExtension};
use glow::HasContext;

/// Broad category of a [`ProgramError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramErrorKind {
    /// A stage could not be produced: bad file name, unreadable file or a compiler error.
    Compile,
    /// The driver refused to link the attached stages.
    Link,
    /// The program is not in a state that allows the requested operation.
    State,
}

#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error(transparent)]
    UnrecognizedExtension(#[from] UnknownExtension),
    #[error("shader {} not found", .0.display())]
    NotFound(PathBuf),
    #[error("unable to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: shader compilation failed\n{log}", file.as_deref().unwrap_or("<source>"))]
    Compile { file: Option<String>, log: String },
    #[error("program link failed:\n{0}")]
    Link(String),
    #[error("program failed to validate\n{0}")]
    Validate(String),
    #[error("unable to create shader program: {0}")]
    Create(String),
    #[error("program has not been compiled")]
    NotCompiled,
    #[error("program has not been linked")]
    NotLinked,
}

impl std::fmt::Display for ProgramErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ProgramErrorKind::Compile => "compile",
            ProgramErrorKind::Link => "link",
            ProgramErrorKind::State => "state",
        })
    }
}

impl ProgramError {
    pub fn kind(&self) -> ProgramErrorKind {
        match self {
            ProgramError::UnrecognizedExtension(_)
            | ProgramError::NotFound(_)
            | ProgramError::Read { .. }
            | ProgramError::Compile { .. } => ProgramErrorKind::Compile,
            ProgramError::Link(_) => ProgramErrorKind::Link,
            ProgramError::Validate(_)
            | ProgramError::Create(_)
            | ProgramError::NotCompiled
            | ProgramError::NotLinked => ProgramErrorKind::State,
        }
    }
}

/// A value that can be uploaded to a uniform variable.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec2(Vec2),
    IVec2(IVec2),
    Vec3(Vec3),
    IVec3(IVec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
    /// Tightly packed `vec3[]` data.
    Vec3Array(Vec<f32>),
}

/// Represents a uniform variable in a shader program.
pub trait Uniform {
    fn to_uniform(&self) -> UniformValue;
}

impl Uniform for bool {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Bool(*self)
    }
}

impl Uniform for i32 {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Int(*self)
    }
}

impl Uniform for u32 {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::UInt(*self)
    }
}

impl Uniform for f32 {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Float(*self)
    }
}

impl Uniform for Vec2 {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Vec2(*self)
    }
}

impl Uniform for IVec2 {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::IVec2(*self)
    }
}

impl Uniform for Vec3 {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Vec3(*self)
    }
}

impl Uniform for IVec3 {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::IVec3(*self)
    }
}

impl Uniform for Vec4 {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Vec4(*self)
    }
}

impl Uniform for Mat3 {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Mat3(*self)
    }
}

impl Uniform for Mat4 {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Mat4(*self)
    }
}

impl<const N: usize> Uniform for [Vec3; N] {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Vec3Array(self.iter().flat_map(|v| v.to_array()).collect())
    }
}

impl<T: Uniform> Uniform for &T {
    fn to_uniform(&self) -> UniformValue {
        (*self).to_uniform()
    }
}

/// An active uniform as reported by the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveUniform {
    pub name: String,
    /// GL type enum, see [`gl_type_name`].
    pub gl_type: u32,
    pub size: i32,
    /// Index of the uniform block holding this uniform, `None` for the default block.
    pub block_index: Option<u32>,
    pub location: Option<i32>,
}

/// An active uniform block and its members.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlock {
    pub name: String,
    pub binding: i32,
    pub members: Vec<ActiveUniform>,
}

/// An active vertex attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAttribute {
    pub name: String,
    pub gl_type: u32,
    pub size: i32,
    pub location: Option<u32>,
}

/// The GPU operations a [`ShaderProgram`] needs.
///
/// Failing operations return the driver's info log as the error.
pub trait ProgramBackend {
    type Program: Copy + std::fmt::Debug;
    type Shader: Copy + std::fmt::Debug;
    type Location: Clone + std::fmt::Debug;

    fn create_program(&self) -> Result<Self::Program, String>;
    fn delete_program(&self, program: Self::Program);

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn compile_shader(&self, shader: Self::Shader, source: &str) -> Result<(), String>;
    fn delete_shader(&self, shader: Self::Shader);
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);

    fn link_program(&self, program: Self::Program) -> Result<(), String>;
    fn validate_program(&self, program: Self::Program) -> Result<(), String>;
    fn use_program(&self, program: Self::Program);

    fn bind_attrib_location(&self, program: Self::Program, index: u32, name: &str);
    fn bind_frag_data_location(&self, program: Self::Program, color: u32, name: &str);

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::Location>;
    /// Every active default block uniform of a linked program with its location.
    fn uniform_locations(&self, program: Self::Program) -> Vec<(String, Self::Location)>;
    /// Uploads to the currently bound program.
    fn set_uniform(&self, location: &Self::Location, value: &UniformValue);

    fn active_uniforms(&self, program: Self::Program) -> Vec<ActiveUniform>;
    fn active_uniform_blocks(&self, program: Self::Program) -> Vec<UniformBlock>;
    fn active_attributes(&self, program: Self::Program) -> Vec<ActiveAttribute>;
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        ShaderStage::TessControl => glow::TESS_CONTROL_SHADER,
        ShaderStage::TessEvaluation => glow::TESS_EVALUATION_SHADER,
        ShaderStage::Compute => glow::COMPUTE_SHADER,
    }
}

impl ProgramBackend for glow::Context {
    type Program = glow::Program;
    type Shader = glow::Shader;
    type Location = glow::UniformLocation;

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, stage_enum(stage)) }
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) -> Result<(), String> {
        unsafe {
            self.shader_source(shader, source);
            HasContext::compile_shader(self, shader);
            if self.get_shader_compile_status(shader) {
                Ok(())
            } else {
                Err(self.get_shader_info_log(shader))
            }
        }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) -> Result<(), String> {
        unsafe {
            HasContext::link_program(self, program);
            if self.get_program_link_status(program) {
                Ok(())
            } else {
                Err(self.get_program_info_log(program))
            }
        }
    }

    fn validate_program(&self, program: Self::Program) -> Result<(), String> {
        unsafe {
            HasContext::validate_program(self, program);
            if self.get_program_parameter_i32(program, glow::VALIDATE_STATUS) != 0 {
                Ok(())
            } else {
                Err(self.get_program_info_log(program))
            }
        }
    }

    fn use_program(&self, program: Self::Program) {
        unsafe { HasContext::use_program(self, Some(program)) }
    }

    fn bind_attrib_location(&self, program: Self::Program, index: u32, name: &str) {
        unsafe { HasContext::bind_attrib_location(self, program, index, name) }
    }

    fn bind_frag_data_location(&self, program: Self::Program, color: u32, name: &str) {
        unsafe { HasContext::bind_frag_data_location(self, program, color, name) }
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::Location> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn uniform_locations(&self, program: Self::Program) -> Vec<(String, Self::Location)> {
        unsafe {
            let indices = (0..self.get_active_uniforms(program)).collect::<Vec<_>>();
            let block_indices =
                self.get_active_uniforms_parameter(program, &indices, glow::UNIFORM_BLOCK_INDEX);
            indices
                .iter()
                .zip(block_indices)
                .filter(|(_, block)| *block < 0)
                .filter_map(|(&index, _)| {
                    let uniform = self.get_active_uniform(program, index)?;
                    let location = self.get_uniform_location(program, &uniform.name)?;
                    Some((uniform.name, location))
                })
                .collect()
        }
    }

    fn set_uniform(&self, location: &Self::Location, value: &UniformValue) {
        let location = Some(location);
        unsafe {
            match value {
                UniformValue::Bool(v) => self.uniform_1_i32(location, *v as i32),
                UniformValue::Int(v) => self.uniform_1_i32(location, *v),
                UniformValue::UInt(v) => self.uniform_1_u32(location, *v),
                UniformValue::Float(v) => self.uniform_1_f32(location, *v),
                UniformValue::Vec2(v) => self.uniform_2_f32(location, v.x, v.y),
                UniformValue::IVec2(v) => self.uniform_2_i32(location, v.x, v.y),
                UniformValue::Vec3(v) => self.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::IVec3(v) => self.uniform_3_i32(location, v.x, v.y, v.z),
                UniformValue::Vec4(v) => self.uniform_4_f32(location, v.x, v.y, v.z, v.w),
                UniformValue::Mat3(m) => self.uniform_matrix_3_f32_slice(location, false, &m.to_cols_array()),
                UniformValue::Mat4(m) => self.uniform_matrix_4_f32_slice(location, false, &m.to_cols_array()),
                UniformValue::Vec3Array(data) => self.uniform_3_f32_slice(location, data),
            }
        }
    }

    fn active_uniforms(&self, program: Self::Program) -> Vec<ActiveUniform> {
        unsafe {
            let count = self.get_active_uniforms(program);
            let indices = (0..count).collect::<Vec<_>>();
            let block_indices =
                self.get_active_uniforms_parameter(program, &indices, glow::UNIFORM_BLOCK_INDEX);
            indices
                .iter()
                .zip(block_indices)
                .filter_map(|(&index, block)| {
                    let uniform = self.get_active_uniform(program, index)?;
                    let location = self
                        .get_uniform_location(program, &uniform.name)
                        .map(|loc| loc.0 as i32);
                    Some(ActiveUniform {
                        name: uniform.name,
                        gl_type: uniform.utype,
                        size: uniform.size,
                        block_index: u32::try_from(block).ok(),
                        location,
                    })
                })
                .collect()
        }
    }

    fn active_uniform_blocks(&self, program: Self::Program) -> Vec<UniformBlock> {
        unsafe {
            let count = self.get_program_parameter_i32(program, glow::ACTIVE_UNIFORM_BLOCKS);
            (0..count.max(0) as u32)
                .map(|block| {
                    let name = self.get_active_uniform_block_name(program, block);
                    let binding = self.get_active_uniform_block_parameter_i32(
                        program,
                        block,
                        glow::UNIFORM_BLOCK_BINDING,
                    );
                    let member_count = self.get_active_uniform_block_parameter_i32(
                        program,
                        block,
                        glow::UNIFORM_BLOCK_ACTIVE_UNIFORMS,
                    );
                    let mut member_indices = vec![0; member_count.max(0) as usize];
                    self.get_active_uniform_block_parameter_i32_slice(
                        program,
                        block,
                        glow::UNIFORM_BLOCK_ACTIVE_UNIFORM_INDICES,
                        &mut member_indices,
                    );
                    let members = member_indices
                        .into_iter()
                        .filter_map(|index| {
                            let uniform = self.get_active_uniform(program, index as u32)?;
                            Some(ActiveUniform {
                                name: uniform.name,
                                gl_type: uniform.utype,
                                size: uniform.size,
                                block_index: Some(block),
                                location: None,
                            })
                        })
                        .collect();
                    UniformBlock {
                        name,
                        binding,
                        members,
                    }
                })
                .collect()
        }
    }

    fn active_attributes(&self, program: Self::Program) -> Vec<ActiveAttribute> {
        unsafe {
            (0..self.get_active_attributes(program))
                .filter_map(|index| {
                    let attribute = self.get_active_attribute(program, index)?;
                    let location = self.get_attrib_location(program, &attribute.name);
                    Some(ActiveAttribute {
                        name: attribute.name,
                        gl_type: attribute.atype,
                        size: attribute.size,
                        location,
                    })
                })
                .collect()
        }
    }
}

/// Represents an OpenGL shader program and the stages compiled into it.
///
/// The GL program object is created by the first compile. Stages are compiled and attached one
/// by one, then [`ShaderProgram::link`] links them and releases every stage object, whether the
/// link succeeded or not.
pub struct ShaderProgram<B: ProgramBackend = glow::Context> {
    backend: Arc<B>,
    handle: Option<B::Program>,
    stages: Vec<B::Shader>,
    linked: bool,
    uniform_locations: FxHashMap<String, Option<B::Location>>,
}

impl<B: ProgramBackend> ShaderProgram<B> {
    /// Creates an empty program.
    pub fn new(backend: &Arc<B>) -> Self {
        Self {
            backend: Arc::clone(backend),
            handle: None,
            stages: Vec::new(),
            linked: false,
            uniform_locations: FxHashMap::default(),
        }
    }

    /// Compiles a shader file, picking the stage from its file name.
    pub fn compile_shader<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ProgramError> {
        let stage = ShaderStage::from_path(&path)?;
        self.compile_shader_as(path, stage)
    }

    /// Compiles a shader file as the given stage.
    pub fn compile_shader_as<P: AsRef<Path>>(
        &mut self,
        path: P,
        stage: ShaderStage,
    ) -> Result<(), ProgramError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ProgramError::NotFound(path.to_path_buf()));
        }
        let source = std::fs::read_to_string(path).map_err(|source| ProgramError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.compile_source(&source, stage, Some(&path.display().to_string()))
    }

    /// Compiles source text as the given stage and attaches it.
    ///
    /// `file_name` only annotates the error message.
    pub fn compile_source(
        &mut self,
        source: &str,
        stage: ShaderStage,
        file_name: Option<&str>,
    ) -> Result<(), ProgramError> {
        let program = self.ensure_program()?;
        let shader = self
            .backend
            .create_shader(stage)
            .map_err(ProgramError::Create)?;

        if let Err(log) = self.backend.compile_shader(shader, source) {
            self.backend.delete_shader(shader);
            return Err(ProgramError::Compile {
                file: file_name.map(str::to_string),
                log,
            });
        }

        self.backend.attach_shader(program, shader);
        self.stages.push(shader);
        log::debug!(
            "Compiled {} shader {}",
            stage,
            file_name.unwrap_or("<source>")
        );
        Ok(())
    }

    /// Links every attached stage.
    ///
    /// Does nothing once the program is linked. On success the uniform location cache is
    /// rebuilt from the driver's list of active uniforms.
    pub fn link(&mut self) -> Result<(), ProgramError> {
        if self.linked {
            return Ok(());
        }
        let program = self.handle.ok_or(ProgramError::NotCompiled)?;

        let result = self.backend.link_program(program);
        if result.is_ok() {
            self.find_uniform_locations();
            self.linked = true;
        }
        self.detach_and_delete_stages();

        result.map_err(ProgramError::Link)
    }

    /// Asks the driver whether the program can run in the current GL state.
    pub fn validate(&self) -> Result<(), ProgramError> {
        let program = self.linked_handle()?;
        self.backend
            .validate_program(program)
            .map_err(ProgramError::Validate)
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) -> Result<(), ProgramError> {
        let program = self.linked_handle()?;
        self.backend.use_program(program);
        Ok(())
    }

    pub fn handle(&self) -> Option<B::Program> {
        self.handle
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Fixes the location of a vertex attribute. Takes effect on the next link.
    pub fn bind_attrib_location(&mut self, index: u32, name: &str) -> Result<(), ProgramError> {
        let program = self.ensure_program()?;
        self.backend.bind_attrib_location(program, index, name);
        Ok(())
    }

    /// Fixes the color attachment of a fragment output. Takes effect on the next link.
    pub fn bind_frag_data_location(&mut self, color: u32, name: &str) -> Result<(), ProgramError> {
        let program = self.ensure_program()?;
        self.backend.bind_frag_data_location(program, color, name);
        Ok(())
    }

    /// Returns the location of a uniform, querying the driver at most once per name.
    pub fn uniform_location(&mut self, name: &str) -> Option<B::Location> {
        if let Some(location) = self.uniform_locations.get(name) {
            return location.clone();
        }
        let program = self.handle?;
        let location = self.backend.uniform_location(program, name);
        self.uniform_locations
            .insert(name.to_string(), location.clone());
        location
    }

    /// Sets a uniform variable of the currently bound program. Unknown names are ignored.
    pub fn set_uniform<T: Uniform>(&mut self, name: &str, value: T) {
        if let Some(location) = self.uniform_location(name) {
            self.backend.set_uniform(&location, &value.to_uniform());
        }
    }

    pub fn active_uniforms(&self) -> Vec<ActiveUniform> {
        self.handle
            .map(|program| self.backend.active_uniforms(program))
            .unwrap_or_default()
    }

    pub fn active_uniform_blocks(&self) -> Vec<UniformBlock> {
        self.handle
            .map(|program| self.backend.active_uniform_blocks(program))
            .unwrap_or_default()
    }

    pub fn active_attributes(&self) -> Vec<ActiveAttribute> {
        self.handle
            .map(|program| self.backend.active_attributes(program))
            .unwrap_or_default()
    }

    /// Logs every uniform of the default block with its location and type.
    pub fn log_active_uniforms(&self) {
        log::info!("Active uniforms:");
        for uniform in self.active_uniforms() {
            if uniform.block_index.is_some() {
                continue;
            }
            log::info!(
                "{:<5} {} ({})",
                uniform.location.unwrap_or(-1),
                uniform.name,
                gl_type_name(uniform.gl_type)
            );
        }
    }

    pub fn log_active_uniform_blocks(&self) {
        for block in self.active_uniform_blocks() {
            log::info!("Uniform block \"{}\" ({}):", block.name, block.binding);
            for member in &block.members {
                log::info!("    {} ({})", member.name, gl_type_name(member.gl_type));
            }
        }
    }

    pub fn log_active_attributes(&self) {
        log::info!("Active attributes:");
        for attribute in self.active_attributes() {
            log::info!(
                "{:<5} {} ({})",
                attribute.location.map_or(-1, |loc| loc as i64),
                attribute.name,
                gl_type_name(attribute.gl_type)
            );
        }
    }

    fn ensure_program(&mut self) -> Result<B::Program, ProgramError> {
        if let Some(program) = self.handle {
            return Ok(program);
        }
        let program = self
            .backend
            .create_program()
            .map_err(ProgramError::Create)?;
        self.handle = Some(program);
        Ok(program)
    }

    fn linked_handle(&self) -> Result<B::Program, ProgramError> {
        match self.handle {
            Some(program) if self.linked => Ok(program),
            _ => Err(ProgramError::NotLinked),
        }
    }

    fn find_uniform_locations(&mut self) {
        self.uniform_locations.clear();
        let Some(program) = self.handle else {
            return;
        };
        for (name, location) in self.backend.uniform_locations(program) {
            self.uniform_locations.insert(name, Some(location));
        }
    }

    fn detach_and_delete_stages(&mut self) {
        let Some(program) = self.handle else {
            return;
        };
        for shader in self.stages.drain(..) {
            self.backend.detach_shader(program, shader);
            self.backend.delete_shader(shader);
        }
    }
}

impl<B: ProgramBackend> Drop for ShaderProgram<B> {
    fn drop(&mut self) {
        self.detach_and_delete_stages();
        if let Some(program) = self.handle.take() {
            self.backend.delete_program(program);
        }
    }
}

/// Maps a GL type enum to its GLSL spelling, `?` for types not listed.
pub fn gl_type_name(gl_type: u32) -> &'static str {
    match gl_type {
        glow::FLOAT => "float",
        glow::FLOAT_VEC2 => "vec2",
        glow::FLOAT_VEC3 => "vec3",
        glow::FLOAT_VEC4 => "vec4",
        glow::DOUBLE => "double",
        glow::INT => "int",
        glow::INT_VEC2 => "ivec2",
        glow::INT_VEC3 => "ivec3",
        glow::UNSIGNED_INT => "unsigned int",
        glow::BOOL => "bool",
        glow::FLOAT_MAT2 => "mat2",
        glow::FLOAT_MAT3 => "mat3",
        glow::FLOAT_MAT4 => "mat4",
        glow::SAMPLER_1D_ARRAY => "sampler1DArray",
        glow::SAMPLER_2D => "sampler2D",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        collections::{HashMap, HashSet},
    };

    use super::*;

    /// Backend that records calls instead of talking to a driver.
    ///
    /// Sources containing `#error` fail to compile and programs fail to link while
    /// `fail_link` is set. Only linked programs expose `uniforms`.
    #[derive(Default)]
    struct RecordingBackend {
        uniforms: Vec<ActiveUniform>,
        fail_link: Cell<bool>,
        state: RefCell<RecordedState>,
    }

    #[derive(Default)]
    struct RecordedState {
        next_id: u32,
        programs: HashSet<u32>,
        linked: HashSet<u32>,
        live_shaders: HashMap<u32, ShaderStage>,
        attached: HashMap<u32, Vec<u32>>,
        bound: Option<u32>,
        location_queries: Vec<String>,
        uploads: Vec<(i32, UniformValue)>,
        links: usize,
    }

    impl RecordingBackend {
        fn with_uniforms(names: &[(&str, Option<u32>)]) -> Self {
            let uniforms = names
                .iter()
                .enumerate()
                .map(|(i, (name, block))| ActiveUniform {
                    name: name.to_string(),
                    gl_type: glow::FLOAT,
                    size: 1,
                    block_index: *block,
                    location: block.is_none().then_some(i as i32),
                })
                .collect();
            Self {
                uniforms,
                ..Default::default()
            }
        }

        fn attached(&self, program: u32) -> Vec<u32> {
            self.state
                .borrow()
                .attached
                .get(&program)
                .cloned()
                .unwrap_or_default()
        }
    }

    impl ProgramBackend for RecordingBackend {
        type Program = u32;
        type Shader = u32;
        type Location = i32;

        fn create_program(&self) -> Result<u32, String> {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = state.next_id;
            state.programs.insert(id);
            Ok(id)
        }

        fn delete_program(&self, program: u32) {
            self.state.borrow_mut().programs.remove(&program);
        }

        fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = state.next_id;
            state.live_shaders.insert(id, stage);
            Ok(id)
        }

        fn compile_shader(&self, _shader: u32, source: &str) -> Result<(), String> {
            if source.contains("#error") {
                Err("0:1(1): error: #error directive".to_string())
            } else {
                Ok(())
            }
        }

        fn delete_shader(&self, shader: u32) {
            self.state.borrow_mut().live_shaders.remove(&shader);
        }

        fn attach_shader(&self, program: u32, shader: u32) {
            self.state
                .borrow_mut()
                .attached
                .entry(program)
                .or_default()
                .push(shader);
        }

        fn detach_shader(&self, program: u32, shader: u32) {
            if let Some(attached) = self.state.borrow_mut().attached.get_mut(&program) {
                attached.retain(|s| *s != shader);
            }
        }

        fn link_program(&self, program: u32) -> Result<(), String> {
            let mut state = self.state.borrow_mut();
            state.links += 1;
            if self.fail_link.get() {
                Err("error: vertex output not consumed".to_string())
            } else {
                state.linked.insert(program);
                Ok(())
            }
        }

        fn validate_program(&self, _program: u32) -> Result<(), String> {
            Ok(())
        }

        fn use_program(&self, program: u32) {
            self.state.borrow_mut().bound = Some(program);
        }

        fn bind_attrib_location(&self, _program: u32, _index: u32, _name: &str) {}

        fn bind_frag_data_location(&self, _program: u32, _color: u32, _name: &str) {}

        fn uniform_location(&self, program: u32, name: &str) -> Option<i32> {
            let mut state = self.state.borrow_mut();
            state.location_queries.push(name.to_string());
            if !state.linked.contains(&program) {
                return None;
            }
            self.uniforms
                .iter()
                .find(|u| u.name == name && u.block_index.is_none())
                .and_then(|u| u.location)
        }

        fn uniform_locations(&self, program: u32) -> Vec<(String, i32)> {
            self.uniforms
                .iter()
                .filter(|u| u.block_index.is_none())
                .filter_map(|u| self.uniform_location(program, &u.name).map(|l| (u.name.clone(), l)))
                .collect()
        }

        fn set_uniform(&self, location: &i32, value: &UniformValue) {
            self.state
                .borrow_mut()
                .uploads
                .push((*location, value.clone()));
        }

        fn active_uniforms(&self, _program: u32) -> Vec<ActiveUniform> {
            self.uniforms.clone()
        }

        fn active_uniform_blocks(&self, _program: u32) -> Vec<UniformBlock> {
            Vec::new()
        }

        fn active_attributes(&self, _program: u32) -> Vec<ActiveAttribute> {
            Vec::new()
        }
    }

    const VERT: &str = "#version 410\nvoid main() { gl_Position = vec4(0.0); }";
    const FRAG: &str = "#version 410\nout vec4 c;\nvoid main() { c = vec4(1.0); }";

    fn linked_program(backend: &Arc<RecordingBackend>) -> ShaderProgram<RecordingBackend> {
        let mut program = ShaderProgram::new(backend);
        program
            .compile_source(VERT, ShaderStage::Vertex, None)
            .unwrap();
        program
            .compile_source(FRAG, ShaderStage::Fragment, None)
            .unwrap();
        program.link().unwrap();
        program
    }

    #[test]
    fn test_use_before_link_is_a_state_error() {
        let backend = Arc::new(RecordingBackend::default());
        let mut program = ShaderProgram::new(&backend);
        assert_eq!(
            program.use_program().unwrap_err().kind(),
            ProgramErrorKind::State
        );

        program
            .compile_source(VERT, ShaderStage::Vertex, None)
            .unwrap();
        assert!(matches!(program.use_program(), Err(ProgramError::NotLinked)));
        assert!(matches!(program.validate(), Err(ProgramError::NotLinked)));
        assert_eq!(backend.state.borrow().bound, None);
    }

    #[test]
    fn test_link_without_compile_fails() {
        let backend = Arc::new(RecordingBackend::default());
        let mut program = ShaderProgram::new(&backend);
        let err = program.link().unwrap_err();
        assert!(matches!(err, ProgramError::NotCompiled));
        assert_eq!(err.kind(), ProgramErrorKind::State);
    }

    #[test]
    fn test_successful_link_releases_stages_and_allows_use() {
        let backend = Arc::new(RecordingBackend::default());
        let program = linked_program(&backend);
        let handle = program.handle().unwrap();

        assert!(program.is_linked());
        assert!(backend.attached(handle).is_empty());
        assert!(backend.state.borrow().live_shaders.is_empty());

        program.use_program().unwrap();
        assert_eq!(backend.state.borrow().bound, Some(handle));
    }

    #[test]
    fn test_failed_link_leaves_no_stage_attached() {
        let backend = Arc::new(RecordingBackend {
            fail_link: Cell::new(true),
            ..Default::default()
        });
        let mut program = ShaderProgram::new(&backend);
        program
            .compile_source(VERT, ShaderStage::Vertex, None)
            .unwrap();
        program
            .compile_source(FRAG, ShaderStage::Fragment, None)
            .unwrap();
        let handle = program.handle().unwrap();
        assert_eq!(backend.attached(handle).len(), 2);

        let err = program.link().unwrap_err();
        assert_eq!(err.kind(), ProgramErrorKind::Link);
        assert!(err.to_string().contains("vertex output not consumed"));
        assert!(!program.is_linked());
        assert!(backend.attached(handle).is_empty());
        assert!(backend.state.borrow().live_shaders.is_empty());
        assert!(program.use_program().is_err());
    }

    #[test]
    fn test_link_is_idempotent_after_success() {
        let backend = Arc::new(RecordingBackend::with_uniforms(&[("MVP", None)]));
        let mut program = linked_program(&backend);
        let queries = backend.state.borrow().location_queries.len();

        program.link().unwrap();
        program.link().unwrap();

        let state = backend.state.borrow();
        assert_eq!(state.links, 1);
        assert_eq!(state.location_queries.len(), queries);
    }

    #[test]
    fn test_link_caches_every_default_block_uniform() {
        let backend = Arc::new(RecordingBackend::with_uniforms(&[
            ("MVP", None),
            ("Material.Alpha_x", None),
            ("Lights.count", Some(0)),
        ]));
        let mut program = linked_program(&backend);
        let queried = backend.state.borrow().location_queries.clone();
        assert_eq!(queried, vec!["MVP", "Material.Alpha_x"]);

        assert_eq!(program.uniform_location("MVP"), Some(0));
        assert_eq!(program.uniform_location("Material.Alpha_x"), Some(1));
        assert_eq!(backend.state.borrow().location_queries.len(), 2);
    }

    #[test]
    fn test_missing_uniform_is_queried_once() {
        let backend = Arc::new(RecordingBackend::with_uniforms(&[("MVP", None)]));
        let mut program = linked_program(&backend);

        for _ in 0..3 {
            assert_eq!(program.uniform_location("DoesNotExist"), None);
        }
        let misses = backend
            .state
            .borrow()
            .location_queries
            .iter()
            .filter(|name| *name == "DoesNotExist")
            .count();
        assert_eq!(misses, 1);
    }

    #[test]
    fn test_miss_cached_before_link_is_dropped_on_link() {
        let backend = Arc::new(RecordingBackend::with_uniforms(&[("MVP", None)]));
        let mut program = ShaderProgram::new(&backend);
        program
            .compile_source(VERT, ShaderStage::Vertex, None)
            .unwrap();
        assert_eq!(program.uniform_location("MVP"), None);

        program
            .compile_source(FRAG, ShaderStage::Fragment, None)
            .unwrap();
        program.link().unwrap();
        assert_eq!(program.uniform_location("MVP"), Some(0));
    }

    #[test]
    fn test_miss_cached_after_failed_link_is_dropped_on_relink() {
        let backend = Arc::new(RecordingBackend::with_uniforms(&[("MVP", None)]));
        backend.fail_link.set(true);
        let mut program = ShaderProgram::new(&backend);
        program
            .compile_source(VERT, ShaderStage::Vertex, None)
            .unwrap();
        assert!(program.link().is_err());
        assert_eq!(program.uniform_location("MVP"), None);

        backend.fail_link.set(false);
        program
            .compile_source(VERT, ShaderStage::Vertex, None)
            .unwrap();
        program.link().unwrap();
        assert!(program.is_linked());
        assert_eq!(program.uniform_location("MVP"), Some(0));
    }

    #[test]
    fn test_error_kind_names() {
        assert_eq!(ProgramErrorKind::Compile.to_string(), "compile");
        assert_eq!(ProgramError::Link(String::new()).kind().to_string(), "link");
        assert_eq!(ProgramError::NotLinked.kind().to_string(), "state");
    }

    #[test]
    fn test_set_uniform_uploads_to_cached_location() {
        let backend = Arc::new(RecordingBackend::with_uniforms(&[
            ("MVP", None),
            ("Resolution", None),
        ]));
        let mut program = linked_program(&backend);

        program.set_uniform("Resolution", IVec2::new(1600, 800));
        program.set_uniform("MVP", Mat4::IDENTITY);
        program.set_uniform("Unknown", 1.0f32);
        program.set_uniform("Resolution", &IVec2::new(800, 600));

        let uploads = backend.state.borrow().uploads.clone();
        assert_eq!(
            uploads,
            vec![
                (1, UniformValue::IVec2(IVec2::new(1600, 800))),
                (0, UniformValue::Mat4(Mat4::IDENTITY)),
                (1, UniformValue::IVec2(IVec2::new(800, 600))),
            ]
        );
    }

    #[test]
    fn test_compile_error_carries_log_and_file_name() {
        let backend = Arc::new(RecordingBackend::default());
        let mut program = ShaderProgram::new(&backend);
        let err = program
            .compile_source("#error broken", ShaderStage::Fragment, Some("glint.frag.glsl"))
            .unwrap_err();

        assert_eq!(err.kind(), ProgramErrorKind::Compile);
        let message = err.to_string();
        assert!(message.starts_with("glint.frag.glsl: shader compilation failed"));
        assert!(message.contains("#error directive"));
        assert!(backend.state.borrow().live_shaders.is_empty());
        assert!(backend.attached(program.handle().unwrap()).is_empty());
    }

    #[test]
    fn test_compile_shader_infers_stage_from_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let vert = dir.path().join("glint.vert.glsl");
        let frag = dir.path().join("glint_frag.glsl");
        std::fs::write(&vert, VERT).unwrap();
        std::fs::write(&frag, FRAG).unwrap();

        let backend = Arc::new(RecordingBackend::default());
        let mut program = ShaderProgram::new(&backend);
        program.compile_shader(&vert).unwrap();
        program.compile_shader(&frag).unwrap();

        let mut stages = backend
            .state
            .borrow()
            .live_shaders
            .values()
            .copied()
            .collect::<Vec<_>>();
        stages.sort_by_key(|stage| stage.name());
        assert_eq!(stages, vec![ShaderStage::Fragment, ShaderStage::Vertex]);
    }

    #[test]
    fn test_compile_shader_rejects_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend::default());
        let mut program = ShaderProgram::new(&backend);

        let unknown = dir.path().join("glint.pixel");
        std::fs::write(&unknown, FRAG).unwrap();
        let err = program.compile_shader(&unknown).unwrap_err();
        assert!(matches!(err, ProgramError::UnrecognizedExtension(_)));
        assert_eq!(err.kind(), ProgramErrorKind::Compile);

        let missing = dir.path().join("missing.frag.glsl");
        let err = program.compile_shader(&missing).unwrap_err();
        assert!(matches!(err, ProgramError::NotFound(ref path) if *path == missing));
        assert_eq!(err.kind(), ProgramErrorKind::Compile);
    }

    #[test]
    fn test_drop_releases_program() {
        let backend = Arc::new(RecordingBackend::default());
        {
            let mut program = ShaderProgram::new(&backend);
            program
                .compile_source(VERT, ShaderStage::Vertex, None)
                .unwrap();
            assert_eq!(backend.state.borrow().programs.len(), 1);
        }
        let state = backend.state.borrow();
        assert!(state.programs.is_empty());
        assert!(state.live_shaders.is_empty());
    }

    #[test]
    fn test_vec3_array_is_packed() {
        let value = [Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)].to_uniform();
        assert_eq!(
            value,
            UniformValue::Vec3Array(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        );
    }

    #[test]
    fn test_type_names() {
        assert_eq!(gl_type_name(glow::FLOAT_MAT4), "mat4");
        assert_eq!(gl_type_name(glow::UNSIGNED_INT), "unsigned int");
        assert_eq!(gl_type_name(0), "?");
    }
}
