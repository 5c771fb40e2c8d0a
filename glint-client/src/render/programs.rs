//! Builds shader programs from the GLSL sources shipped with the binary or from a directory.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use glint_core::ShaderStage;
use include_dir::{Dir, include_dir};

use crate::abs::{ProgramBackend, ProgramError, ShaderProgram};

static SHADERS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/src/render/shaders");

/// Fragment output every program writes to color attachment 0.
pub const FRAG_OUTPUT: &str = "FragColor";

/// Source of a shader embedded at build time.
pub fn embedded_source(file_name: &str) -> Option<&'static str> {
    SHADERS.get_file(file_name)?.contents_utf8()
}

/// Compiles and links `files` into one program.
///
/// Files are read from `dir` when given, otherwise from the embedded copies. Attribute
/// locations in `attributes` are bound before linking, [`FRAG_OUTPUT`] goes to attachment 0.
pub fn build_program<B: ProgramBackend>(
    backend: &Arc<B>,
    files: &[&str],
    dir: Option<&Path>,
    attributes: &[&str],
) -> Result<ShaderProgram<B>, ProgramError> {
    let mut program = ShaderProgram::new(backend);
    for file in files {
        match dir {
            Some(dir) => program.compile_shader(dir.join(file))?,
            None => {
                let stage = ShaderStage::from_path(file)?;
                let source =
                    embedded_source(file).ok_or_else(|| ProgramError::NotFound(PathBuf::from(file)))?;
                program.compile_source(source, stage, Some(file))?;
            }
        }
    }
    for (index, name) in attributes.iter().enumerate() {
        program.bind_attrib_location(index as u32, name)?;
    }
    program.bind_frag_data_location(0, FRAG_OUTPUT)?;
    program.link()?;
    Ok(program)
}
