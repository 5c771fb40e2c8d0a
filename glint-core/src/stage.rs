//! Shader stages and the file-name convention used to pick them.
//!
//! A stage is inferred from the suffix of a shader's file name. Both short suffixes (`.vs`,
//! `.frag`) and the dual-suffix convention (`glint.vert.glsl`, `glint_vert.glsl`) are
//! recognized, see [`EXTENSIONS`].

use std::path::Path;

/// One programmable stage of the GL pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

/// Every recognized file-name suffix and the stage it selects.
pub const EXTENSIONS: &[(&str, ShaderStage)] = &[
    (".vs", ShaderStage::Vertex),
    (".vert", ShaderStage::Vertex),
    ("_vert.glsl", ShaderStage::Vertex),
    (".vert.glsl", ShaderStage::Vertex),
    (".gs", ShaderStage::Geometry),
    (".geom", ShaderStage::Geometry),
    (".geom.glsl", ShaderStage::Geometry),
    (".tcs", ShaderStage::TessControl),
    (".tcs.glsl", ShaderStage::TessControl),
    (".tes", ShaderStage::TessEvaluation),
    (".tes.glsl", ShaderStage::TessEvaluation),
    (".fs", ShaderStage::Fragment),
    (".frag", ShaderStage::Fragment),
    ("_frag.glsl", ShaderStage::Fragment),
    (".frag.glsl", ShaderStage::Fragment),
    (".cs", ShaderStage::Compute),
    (".cs.glsl", ShaderStage::Compute),
];

/// Returned when a file name carries no suffix from [`EXTENSIONS`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized shader extension {extension:?} in {file_name:?}")]
pub struct UnknownExtension {
    pub file_name: String,
    pub extension: String,
}

impl ShaderStage {
    /// Looks up a suffix, as returned by [`shader_extension`], in the extension table.
    pub fn from_extension(extension: &str) -> Option<Self> {
        EXTENSIONS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, stage)| *stage)
    }

    /// Infers the stage of a shader file from its name.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, UnknownExtension> {
        let file_name = path
            .as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = shader_extension(&file_name);
        Self::from_extension(extension).ok_or_else(|| UnknownExtension {
            file_name: file_name.clone(),
            extension: extension.to_string(),
        })
    }

    /// The lowercase name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Geometry => "geometry",
            ShaderStage::TessControl => "tessellation control",
            ShaderStage::TessEvaluation => "tessellation evaluation",
            ShaderStage::Compute => "compute",
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Extracts the stage-selecting suffix of a file name.
///
/// The suffix starts at the last `.`. When that suffix is `.glsl` it is extended back to the
/// previous `.`, or to the previous `_` when there is no other dot. Returns an empty string when
/// the name has no usable suffix.
pub fn shader_extension(file_name: &str) -> &str {
    let Some(dot) = file_name.rfind('.') else {
        return "";
    };
    let extension = &file_name[dot..];
    if extension != ".glsl" {
        return extension;
    }

    let stem = &file_name[..dot];
    match stem.rfind('.').or_else(|| stem.rfind('_')) {
        Some(start) => &file_name[start..],
        None => "",
    }
}
